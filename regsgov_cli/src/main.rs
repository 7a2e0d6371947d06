mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use regsgov_lib::CancelFlag;

use crate::commands::ApiArgs;

#[derive(Parser)]
#[command(name = "regsgov")]
#[command(about = "Bulk-retrieve dockets, documents and comments from Regulations.gov")]
struct Cli {
    #[command(flatten)]
    api: ApiArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every document in a docket, its comments, and their details
    Docket(commands::docket::DocketArgs),
    /// Fetch every comment on one document, and their details
    Document(commands::document::DocumentArgs),
    /// Harvest header records for one resource kind past the 5,000-record cap
    Headers(commands::headers::HeadersArgs),
    /// Fetch detail records for a list of IDs
    Details(commands::details::DetailsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("regsgov=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted; stopping at the next page or item");
                cancel.cancel();
            }
        });
    }

    match &cli.command {
        Commands::Docket(args) => commands::docket::run(args, &cli.api, cancel).await?,
        Commands::Document(args) => commands::document::run(args, &cli.api, cancel).await?,
        Commands::Headers(args) => commands::headers::run(args, &cli.api, cancel).await?,
        Commands::Details(args) => commands::details::run(args, &cli.api, cancel).await?,
    }

    Ok(())
}
