use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mailsort")]
#[command(about = "Extract email addresses and sort them into categories", long_about = None)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["text", "file", "directory"])
))]
pub struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    pub config: Option<String>,

    /// Extract emails from a text string
    #[arg(long)]
    pub text: Option<String>,

    /// Extract emails from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Extract emails from all files in a directory
    #[arg(long)]
    pub directory: Option<PathBuf>,

    /// Search the directory recursively
    #[arg(long, default_value_t = false, requires = "directory")]
    pub recursive: bool,

    /// Only read files with these extensions (comma-separated), e.g. txt,log
    #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = Vec::<String>::new())]
    pub ext: Vec<String>,

    /// Glob patterns to skip while walking a directory (comma-separated)
    #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = Vec::<String>::new())]
    pub exclude: Vec<String>,

    /// Preserve email case (default: lowercase)
    #[arg(long, default_value_t = false)]
    pub case_sensitive: bool,

    /// Categorization method
    #[arg(long, value_parser = ["domain", "type", "keywords", "pattern", "custom", "none"])]
    pub categorize: Option<String>,

    /// Directory of TOML rule files for the custom method
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Output file path; prints to stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_parser = ["json", "csv", "txt"])]
    pub format: Option<String>,

    /// Group txt output by category
    #[arg(long, default_value_t = false)]
    pub grouped: bool,

    /// Include statistics
    #[arg(long, default_value_t = false)]
    pub stats: bool,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Suppress everything except results
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,
}
