//! Wardrobe-Common: Shared types, identifiers, and errors.
//!
//! This crate provides the data model used across wardrobe:
//!
//! - **Typed IDs**: An opaque [`ItemId`] assigned by the remote store
//! - **Core Types**: Wardrobe items, clothing analyses, outfit recommendations
//! - **Error Handling**: The error taxonomy shared by every pipeline stage
//!
//! # Examples
//!
//! ```
//! use wardrobe_common::{Error, ItemId, ItemStatus, Result};
//!
//! let id = ItemId::from("42");
//! assert_eq!(id.as_str(), "42");
//! assert_eq!(ItemStatus::default(), ItemStatus::Processing);
//!
//! fn example() -> Result<()> {
//!     Err(Error::EmptyWardrobe)
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
