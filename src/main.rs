use clap::Parser;
use cmd_audit::{
    Cli, Command,
    handlers::{handle_build, handle_check},
    logging::init_tracing,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Command::Build(args) => handle_build(&cli, args),
        Command::Check(args) => handle_check(&cli, args),
    };
    result.into()
}
