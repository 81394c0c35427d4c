//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use mindia_core::SortKey;
use std::path::PathBuf;
use uuid::Uuid;

/// Mindia - on-demand media transformation with derived-variant caching
#[derive(Parser, Debug)]
#[command(name = "mindia")]
#[command(about = "On-demand media transformation with derived-variant caching", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file used instead of ./mindia.toml
    #[arg(short, long, global = true, env = "MINDIA_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a local file
    Upload {
        /// File to upload
        file: PathBuf,

        /// Directory to store the media under
        #[arg(long, default_value = "/")]
        dir: String,

        /// Keep the local file name instead of generating a unique one
        #[arg(long)]
        keep_name: bool,

        /// Content type, guessed from the file extension when omitted
        #[arg(long)]
        content_type: Option<String>,

        /// Transformation to cache right away (repeatable)
        #[arg(short, long = "transformation")]
        transformations: Vec<String>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Show a media record
    Get {
        /// Media path
        path: String,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Write a media object, or one of its variants, to a local file
    Download {
        /// Media path, optionally prefixed with transformation segments
        path: String,

        /// Transformation to apply
        #[arg(short, long)]
        transformation: Option<String>,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write several originals to a local zip archive
    Archive {
        /// Media paths
        #[arg(required = true)]
        paths: Vec<String>,

        /// Destination archive
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List media records
    List {
        /// Only records under this prefix
        #[arg(default_value = "/")]
        prefix: String,

        /// Records to skip
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Maximum number of records to display
        #[arg(long, default_value = "50")]
        limit: usize,

        /// Sort key (created_at or content_length)
        #[arg(long, default_value = "created_at")]
        sort: SortKey,

        /// Sort ascending
        #[arg(long)]
        ascending: bool,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Delete media with all their variants
    Delete {
        /// Media paths
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Move media and its variants to another directory
    Move {
        /// Media path
        src: String,

        /// Destination directory
        dst: String,
    },

    /// Copy media and its variants to another directory
    Copy {
        /// Media path
        src: String,

        /// Destination directory
        dst: String,
    },

    /// Delete cached variants
    ClearCache {
        /// Media whose variants are deleted
        #[arg(required_unless_present = "all")]
        path: Option<String>,

        /// Delete every cached variant
        #[arg(long, conflicts_with = "path")]
        all: bool,
    },

    /// Start colorizing media in the background
    Colorize {
        /// Media path
        path: String,
    },

    /// Named transformation commands
    #[command(subcommand)]
    Named(NamedCommands),

    /// Task inspection commands
    #[command(subcommand)]
    Tasks(TaskCommands),

    /// Run the task scheduler and storage-usage collector until Ctrl-C
    Serve,
}

/// Named transformation subcommands
#[derive(Subcommand, Debug)]
pub enum NamedCommands {
    /// List named transformations
    List {
        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Create or update a named transformation
    Set {
        /// Alias, used as t_<name>
        name: String,

        /// Transformation string it expands to
        transformations: String,
    },

    /// Delete a named transformation
    Delete {
        /// Alias
        name: String,
    },

    /// Delete every named transformation
    Clear,
}

/// Task inspection subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List task records
    List {
        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Show a task record
    Show {
        /// Task id
        id: Uuid,
    },
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable
    Human,
    /// JSON
    Json,
}
