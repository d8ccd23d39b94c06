use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "annotation-scanner")]
#[command(about = "Find compiled classes that carry a given annotation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding compiled classes [default: ./target/classes]
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Marker manifest [default: <root>/META-INF/markers.json]
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Log message language, e.g. ru_RU or en_US
    #[arg(long, value_name = "TAG")]
    pub locale: Option<String>,

    /// tracing filter directive, e.g. debug or annotation_scanner=debug
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Find {
        /// Fully-qualified annotation name
        marker: String,

        #[arg(short = 'p', long = "package", value_name = "PKG")]
        packages: Vec<String>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    Candidates {
        #[arg(short = 'p', long = "package", value_name = "PKG")]
        packages: Vec<String>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
