use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "veriframe")]
#[command(author, version, about = "Media manipulation detection via structural similarity")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the detection HTTP server
    Serve {
        /// Host to bind to (overrides VERIFRAME_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides VERIFRAME_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Compare two media URLs and print the verdict as JSON
    Detect {
        /// URL of the original artifact
        #[arg(required = true)]
        url_original: String,

        /// URL of the suspect artifact
        #[arg(required = true)]
        url_suspect: String,
    },

    /// Render a difference image for two local images
    Diff {
        /// Original image
        original: PathBuf,

        /// Suspect image
        suspect: PathBuf,

        /// Output path for the difference PNG
        #[arg(short, long, default_value = "diff.png")]
        output: PathBuf,
    },

    /// Print basic properties of a local image as JSON
    Inspect {
        /// Image file to analyze
        file: PathBuf,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Display version information
    Version,
}
