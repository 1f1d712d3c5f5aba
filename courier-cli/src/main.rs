use clap::{Parser, Subcommand};

use rst_common::with_tokio::tokio;
use rst_common::with_tracing::tracing_subscriber::{
    self, layer::SubscriberExt, util::SubscriberInitExt,
};

use prople_courier_cli::commands::envelope::{envelope_handler, EnvelopeArgs};
use prople_courier_cli::commands::handler::ContextHandler;
use prople_courier_cli::commands::negotiate::{negotiate_handler, NegotiateArgs};
use prople_courier_cli::commands::profile::{profile_handler, ProfileArgs};
use prople_courier_cli::types::CliError;

#[derive(Parser)]
#[command(name = "prople-courier-cli")]
#[command(version = "0.1.0")]
#[command(long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Parse and build accept profiles")]
    Profile(ProfileArgs),

    #[command(about = "Detect, pack and unpack envelopes")]
    Envelope(EnvelopeArgs),

    #[command(about = "Select the first supported accept profile")]
    Negotiate(NegotiateArgs),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=debug,prople_courier_core=debug",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let ctx = ContextHandler::new(cli.config)?;

    match cli.commands {
        Commands::Profile(args) => profile_handler(&ctx, args.commands).await,
        Commands::Envelope(args) => envelope_handler(&ctx, args.commands).await,
        Commands::Negotiate(args) => negotiate_handler(&ctx, args).await,
    }
}
