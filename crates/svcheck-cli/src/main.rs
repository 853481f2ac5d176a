use clap::Parser;
use svcheck_batch::BatchConfig;
use svcheck_cli::{Cli, Commands};
use tracing::{debug, error};
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {err}");
    }

    if let Err(err) = run(&cli) {
        error!("{err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => BatchConfig::load(path)?,
        None => BatchConfig::default(),
    };
    debug!("configuration: {config:?}");

    match &cli.command {
        Commands::Compare(args) => commands::compare::handle(args, &config),
        Commands::ExtractSv { archive, out } => commands::extract::handle(archive, out),
        Commands::Cases { dataset, hour } => {
            commands::cases::handle(dataset, hour.as_deref(), &config)
        }
    }
}
