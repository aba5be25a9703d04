use clap::{Parser, Subcommand};

mod commands;
mod util;

#[derive(Parser)]
#[command(
    name = "formulab",
    version,
    about = "Formulab CLI: generate cosmetic formulas and recover JSON from agent replies"
)]
struct Cli {
    /// API base URL
    #[arg(long, env = "FORMULAB_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Ask the API for a new formula
    Generate {
        /// Product brief, e.g. "lightweight daytime moisturizer for oily skin with SPF 30"
        #[arg(long, short)]
        message: String,
        /// Ask the server to also write the formula to its save path
        #[arg(long)]
        save_file: bool,
    },
    /// Recover a formula from saved agent output, without calling the API
    Recover {
        /// File with the raw reply, or "-" for stdin
        #[arg(long, short, default_value = "-")]
        file: String,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Health => commands::health::run(&cli.api_url).await,
        Commands::Generate { message, save_file } => {
            commands::generate::run(&cli.api_url, &message, save_file).await
        }
        Commands::Recover { file } => commands::recover::run(&file),
    };
    std::process::exit(code);
}
