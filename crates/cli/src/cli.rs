use std::path::PathBuf;

use uuid::Uuid;

#[derive(clap::Parser, Debug)]
#[clap(name = "mado", about = "Fetch manga metadata and chapter images")]
pub struct Cli {
    /// Config file to use instead of the default location
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// List registered modules
    Modules,
    /// Fetch manga information and its chapter list
    Info {
        /// Manga URL
        url: String,
        /// Module to use instead of matching the URL's domain
        #[clap(long)]
        module: Option<Uuid>,
        /// Print the raw JSON result
        #[clap(long)]
        json: bool,
    },
    /// List the images of a chapter
    Chapter {
        /// Chapter id, usually its URL
        id: String,
        #[clap(long)]
        module: Option<Uuid>,
        #[clap(long)]
        json: bool,
    },
    /// Download every image of a chapter
    Download {
        /// Chapter id, usually its URL
        id: String,
        #[clap(long)]
        module: Option<Uuid>,
        /// Target directory, defaults to `output.dir` from the config
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
    /// Manage configuration
    Config {
        #[clap(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set { key: String, value: String },
    /// Get a configuration value
    Get { key: String },
    /// Show all configuration
    Show,
    /// Reset configuration to defaults
    Reset,
}
