use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wardrobe")]
#[command(author, version, about = "Catalog clothes and get AI outfit suggestions")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress, upload, and analyze clothing photos
    Upload {
        /// Image files to add
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show the most recent items
    List,

    /// Suggest an outfit from the analyzed items
    Recommend {
        /// Where you are going
        #[arg(long)]
        occasion: Option<String>,

        /// What the weather is like
        #[arg(long)]
        weather: Option<String>,
    },

    /// Show one item
    Show {
        /// Item id
        id: String,
    },

    /// Retry analysis for an item stuck in processing
    Reanalyze {
        /// Item id
        id: String,
    },

    /// Delete an item record
    Remove {
        /// Item id
        id: String,
    },

    /// Print the SQL that provisions the table and bucket
    Schema,

    /// View or change stored credentials
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print effective settings with secrets masked
    Show,

    /// Store credentials; blank values keep the current ones
    Set {
        /// Generation API key
        #[arg(long)]
        gemini_key: Option<String>,

        /// Storage project URL
        #[arg(long)]
        supabase_url: Option<String>,

        /// Storage anon key
        #[arg(long)]
        supabase_key: Option<String>,
    },
}
