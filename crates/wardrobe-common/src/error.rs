//! Error taxonomy shared by every wardrobe component.
//!
//! Each pipeline stage fails with its own variant so callers can tell a bad
//! photo from a rejected upload or an unparseable model reply.

/// Common error type for wardrobe.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required credentials are missing; raised before any network call.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The input is not a decodable image.
    #[error("Image decode failed: {0}")]
    Decode(String),

    /// The resized image could not be re-encoded.
    #[error("Image encode failed: {0}")]
    Encode(String),

    /// Object storage rejected the blob.
    #[error("Image upload failed: {0}")]
    Upload(String),

    /// The catalog record could not be created.
    #[error("Record insert failed: {0}")]
    Insert(String),

    /// The catalog record could not be updated (missing id or rejected write).
    #[error("Record update failed: {0}")]
    Update(String),

    /// A catalog read failed.
    #[error("Catalog fetch failed: {0}")]
    Fetch(String),

    /// A catalog record could not be removed.
    #[error("Record delete failed: {0}")]
    Delete(String),

    /// The requested record does not exist.
    #[error("Item not found: {0}")]
    NotFound(String),

    /// The generation endpoint answered with a non-success status.
    #[error("Generation API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The model output was not the expected JSON after fence stripping.
    #[error("Failed to parse model output: {0}")]
    Parse(String),

    /// No `available` items exist to build an outfit from.
    #[error("Wardrobe is empty; upload and analyse some clothes first")]
    EmptyWardrobe,

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new Config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new Decode error.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new Parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Network error.
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    /// Whether the error was raised by the local configuration check.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
