use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::executor::OutputFormat;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "kubectl-pipeline",
    version,
    about = "View, edit and delete pipeline resources in a Kubernetes cluster.",
    args_conflicts_with_subcommands = true
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// [NAMESPACE] [PIPELINE]... to list
    pub args: Vec<String>,

    /// kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Path to a config file overriding resource types and editor
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_filter: String,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print pipelines as YAML
    View {
        /// [NAMESPACE] [PIPELINE]...
        args: Vec<String>,

        #[arg(short, long, value_enum, default_value_t = Format::Yaml)]
        output: Format,
    },
    /// Delete pipelines
    #[command(visible_aliases = ["del", "remove", "rm"])]
    Delete {
        /// [NAMESPACE] [PIPELINE]...
        args: Vec<String>,
    },
    /// Edit pipelines in $EDITOR and apply the result
    #[command(visible_alias = "e")]
    Edit {
        /// [NAMESPACE] [PIPELINE]...
        args: Vec<String>,
    },
    /// Print namespaces that host pipelines
    #[command(hide = true)]
    Namespaces,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Yaml,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Yaml => OutputFormat::Yaml,
            Format::Json => OutputFormat::Json,
        }
    }
}
