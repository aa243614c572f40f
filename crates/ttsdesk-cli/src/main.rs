//! CLI entry point - the composition root.
//!
//! Commands that own a server go through `bootstrap`; the listing and
//! status commands only talk HTTP to a server that is already running.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use ttsdesk_cli::handlers::catalog::Catalog;
use ttsdesk_cli::{Cli, CliError, Commands, bootstrap, handlers, settings_from_cli};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .ok();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command.as_ref() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let settings = settings_from_cli(&cli)?;

    match command {
        Commands::Serve { model } => {
            let ctx = bootstrap(settings)?;
            let result = handlers::serve::execute(&ctx, model.clone()).await;
            ctx.shutdown().await;
            result?;
        }
        Commands::Say(args) => {
            let ctx = bootstrap(settings)?;
            let result = handlers::say::execute(&ctx, args.clone()).await;
            ctx.shutdown().await;
            result?;
        }
        Commands::Models => handlers::catalog::execute(&settings, Catalog::Models).await?,
        Commands::Speakers => handlers::catalog::execute(&settings, Catalog::Speakers).await?,
        Commands::Languages => handlers::catalog::execute(&settings, Catalog::Languages).await?,
        Commands::Status => handlers::status::execute(&settings).await?,
        Commands::Pythons => handlers::pythons::execute().await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Load environment variables before clap reads TTSDESK_*
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }
}
