use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "marksync")]
#[command(about = "Browse, edit and selectively sync a bookmark tree")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Bookmark store file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub bookmarks: Option<PathBuf>,

    /// Override the sync API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the bookmark tree
    #[command(alias = "ls")]
    Tree {
        /// Only show folders, URLs and names matching this text
        #[arg(short, long)]
        query: Option<String>,
        /// Only list folders (with their depth)
        #[arg(long)]
        folders: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search bookmarks by title or URL
    Search {
        /// Search query
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a bookmark
    #[command(alias = "new")]
    Add {
        /// Bookmark title
        title: String,
        /// Bookmark URL
        url: String,
        /// Parent folder id (defaults to "Other bookmarks")
        #[arg(short, long, value_name = "ID")]
        parent: Option<String>,
    },
    /// Change a bookmark's title and/or URL
    Edit {
        /// Bookmark id
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },
    /// Delete one or more bookmarks
    #[command(alias = "rm")]
    Delete {
        /// Bookmark ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Move a bookmark or folder
    #[command(alias = "mv")]
    Move {
        /// Bookmark or folder id
        id: String,
        /// Destination folder id
        #[arg(long, value_name = "ID", conflicts_with = "before")]
        to: Option<String>,
        /// Position inside the destination folder
        #[arg(long, requires = "to")]
        index: Option<usize>,
        /// Place the item where this bookmark currently sits
        #[arg(long, value_name = "ID")]
        before: Option<String>,
    },
    /// Create a folder
    Mkdir {
        /// Folder name
        name: String,
        /// Parent folder id (defaults to "Other bookmarks")
        #[arg(short, long, value_name = "ID")]
        parent: Option<String>,
    },
    /// Delete a folder and everything in it
    Rmdir {
        /// Folder id
        id: String,
    },
    /// Send selected bookmarks to the notebook directory
    Sync {
        /// Sync key issued by the notebook (or MARKSYNC_SYNC_KEY)
        #[arg(long, value_name = "KEY")]
        key: Option<String>,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Upload selected bookmarks in chunks
    Upload {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Manage privacy consent for syncing
    Consent {
        #[command(subcommand)]
        command: ConsentCommands,
    },
    /// Show or update CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Which bookmarks a sync or upload sends.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionArgs {
    /// Bookmark id to include (repeatable)
    #[arg(long = "url", value_name = "ID")]
    pub urls: Vec<String>,
    /// Folder id whose whole subtree is included (repeatable)
    #[arg(long = "folder", value_name = "ID")]
    pub folders: Vec<String>,
    /// Include every bookmark
    #[arg(long)]
    pub all: bool,
}

impl SelectionArgs {
    pub fn is_empty(&self) -> bool {
        !self.all && self.urls.is_empty() && self.folders.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConsentCommands {
    /// Agree that selected bookmarks may be sent to the server
    Grant,
    /// Withdraw consent
    Revoke,
    /// Show whether consent was given
    Status,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Update stored configuration values
    Set {
        /// API base URL (e.g. <https://notebook.example.com/api>)
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Default bookmark store file
        #[arg(long, value_name = "PATH")]
        bookmarks_path: Option<PathBuf>,
        /// Bearer key for chunked uploads (or MARKSYNC_API_KEY)
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
    },
    /// Print the config file location
    Path,
}
