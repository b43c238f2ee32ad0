mod cli;
mod commands;
mod error;
mod interrupt;
mod menu;
mod output;

use std::io::IsTerminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ConfigCommand};
use crate::commands::{Action, Context, util};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.quiet);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, quiet: bool) {
    let filter = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let global = cli.global;
    match cli.command.unwrap_or(Command::Menu) {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "dcos-iam", &mut std::io::stdout());
            Ok(())
        }

        Command::Config(args) if matches!(args.command, ConfigCommand::Init) => {
            commands::config_cmd::init(&global.config).map(|_| ())
        }

        Command::Menu => {
            let mut ctx = Context::load(&global, std::io::stdin().is_terminal())?;
            ctx.interrupts.watch();
            menu::run(&mut ctx, &global).await
        }

        command => {
            let Some(action) = Action::from_command(command) else {
                return Ok(());
            };
            let mut ctx = Context::load(&global, std::io::stdin().is_terminal())?;
            ctx.interrupts.watch();
            if action.is_destructive() && !util::confirm(&format!("{action}?"), global.yes)? {
                return Ok(());
            }
            commands::dispatch(action, &mut ctx, &global).await
        }
    }
}
