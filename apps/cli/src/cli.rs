use std::path::PathBuf;

use clap::{Parser, Subcommand};
use filedrop_upload::FailurePolicy;

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload, list, search and download files on a filedrop server")]
pub struct Cli {
    /// Configuration file (defaults to the per-user config path)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Server base URL, e.g. http://127.0.0.1:8000
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload a file chunk by chunk
    Upload {
        path: PathBuf,
        /// Chunk size in bytes
        #[arg(long)]
        chunk_size: Option<u64>,
        /// What to do when a chunk fails: abort or continue
        #[arg(long)]
        policy: Option<FailurePolicy>,
        /// Store the file under a different name
        #[arg(long = "as")]
        name: Option<String>,
    },
    /// List every stored file
    List,
    /// Find stored files whose name contains a pattern
    Search { pattern: String },
    /// Download a stored file
    Download {
        name: String,
        /// Destination directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the download URL of a stored file
    Url { name: String },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
