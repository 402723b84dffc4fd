use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "cmd-audit",
    version,
    about = "Validator and registry builder for command/prompt documents",
    long_about = "cmd-audit checks command documents for required sections, hard-coded secrets and dangerous shell patterns, scores their documentation, and writes a registry of the results."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (also raises the log level to info)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Explicit configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate every document under a root and write the registry
    Build(BuildArgs),
    /// Validate a single document inside a project
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Directory containing the command documents
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Additional exclusion substrings (repeatable)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Run caution/dangerous snippets in the sandbox
    #[arg(long)]
    pub sandbox: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,

    /// Do not write the registry file
    #[arg(long)]
    pub no_write: bool,

    /// Registry output path (default from configuration)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Document path, relative to the project root
    pub file: PathBuf,

    /// Project root the path is resolved against
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_defaults() {
        let cli = Cli::try_parse_from(["cmd-audit", "build"]).unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.root, PathBuf::from("."));
        assert!(args.exclude.is_empty());
        assert!(!args.sandbox);
        assert!(!args.no_write);
        assert_eq!(args.format, OutputFormat::Terminal);
    }

    #[test]
    fn test_parse_build_options() {
        let cli = Cli::try_parse_from([
            "cmd-audit", "build", "./commands", "-e", "/drafts/", "--exclude", "/wip/",
            "--sandbox", "--format", "json", "--no-write", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.exclude, vec!["/drafts/", "/wip/"]);
        assert!(args.sandbox);
        assert!(args.no_write);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from(["cmd-audit", "check", "docs/guide.md", "--root", "/proj"]).unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.file, PathBuf::from("docs/guide.md"));
        assert_eq!(args.root, PathBuf::from("/proj"));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["cmd-audit"]).is_err());
    }
}
