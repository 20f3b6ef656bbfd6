mod cli;
mod commands;
mod config;
mod error;
mod notify;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use linkseal_core::LinkService;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::notify::TermSink;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands need no service connection.
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global).await,

        // Completions need no service connection.
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "linkseal", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let service_config = config::build_service_config(&cli.global)?;
            let use_color = output::should_color(&cli.global.color);
            let service = LinkService::new(service_config)?
                .with_notifier(Arc::new(TermSink::new(use_color, cli.global.quiet)));

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &service, &cli.global).await
        }
    }
}
