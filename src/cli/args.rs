//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::services::OutputFormat;
use crate::domain::SymbolNaming;

/// Binary size treemap: renders `go tool nm -size` style symbol tables as nested SVG boxes
#[derive(Parser, Debug)]
#[command(name = "binsize-treemap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (layered over the global config)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Read the symbol table from this file instead of stdin
    #[arg(short, long, value_hint = ValueHint::FilePath, conflicts_with = "coverprofile")]
    pub input: Option<PathBuf>,

    /// Render a Go coverage profile instead of a symbol table
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub coverprofile: Option<PathBuf>,

    /// Write the document to this file instead of stdout
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'W', long)]
    pub width: Option<f64>,

    /// Canvas height
    #[arg(short = 'H', long)]
    pub height: Option<f64>,

    /// Gap between sibling boxes
    #[arg(long)]
    pub margin_box: Option<f64>,

    /// Space between a box border and its children
    #[arg(long)]
    pub padding_box: Option<f64>,

    /// Space around the outermost box
    #[arg(long)]
    pub padding: Option<f64>,

    /// Maximum depth below the root (0 = unlimited)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Keep symbols as leaves below their packages
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub symbols: Option<bool>,

    /// Keep symbols without a package prefix
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub symbols_pure: Option<bool>,

    /// Keep the bucket of empty or unparseable names
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub unknown: Option<bool>,

    /// Output CSV rows instead of SVG (same as --format csv)
    #[arg(long, conflicts_with = "format")]
    pub csv: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Symbol naming convention
    #[arg(long, value_enum)]
    pub naming: Option<NamingArg>,

    /// Print shell completions and exit
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a commented config template
    Template,

    /// Show config paths
    Path,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Svg,
    Csv,
    Tree,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Svg => OutputFormat::Svg,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Tree => OutputFormat::Tree,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingArg {
    /// `import/path.Type.Method`
    Go,
    /// `ns::Type::method`
    Cpp,
}

impl From<NamingArg> for SymbolNaming {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Go => SymbolNaming::Go,
            NamingArg::Cpp => SymbolNaming::Cpp,
        }
    }
}
