use clap::Parser;

use restockd::cli::{commands, output, Cli};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    if let Err(e) = commands::dispatch(cli).await {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
