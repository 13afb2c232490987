//! medbrief CLI — the main entry point.
//!
//! Commands:
//! - `chat`      — Interactive chat or single-question mode
//! - `briefing`  — Generate a doctor briefing for a patient
//! - `condition` — Condition-focused summary for a patient
//! - `summarize` — Summarize a consultation transcript (and ingest it)
//! - `ingest`    — Write a record directly into the index

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "medbrief",
    about = "medbrief — retrieval-augmented medical records assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the medical records assistant
    Chat {
        /// Ask a single question instead of entering interactive mode
        #[arg(short, long)]
        question: Option<String>,

        /// Focus the conversation on one patient
        #[arg(short, long)]
        patient: Option<String>,
    },

    /// Generate a doctor briefing for a patient
    Briefing {
        /// Patient identifier
        patient: String,

        /// Briefing flavor: comprehensive or recent
        #[arg(short, long, default_value = "comprehensive")]
        mode: String,
    },

    /// Generate a condition-focused summary for a patient
    Condition {
        /// Patient identifier
        patient: String,

        /// Condition to focus on (e.g. "diabetes")
        condition: String,
    },

    /// Summarize a consultation transcript and ingest the summary
    Summarize {
        /// Patient identifier
        patient: String,

        /// Path to a transcript text file ('-' reads stdin)
        file: String,

        /// Skip writing the summary back to the index
        #[arg(long)]
        no_ingest: bool,
    },

    /// Write a record directly into the index
    Ingest {
        /// Patient identifier
        patient: String,

        /// Record text
        text: String,

        /// Record category
        #[arg(short, long, default_value = "general")]
        category: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat { question, patient } => commands::chat::run(question, patient).await?,
        Commands::Briefing { patient, mode } => commands::briefing::run(&patient, &mode).await?,
        Commands::Condition { patient, condition } => {
            commands::condition::run(&patient, &condition).await?
        }
        Commands::Summarize {
            patient,
            file,
            no_ingest,
        } => commands::summarize::run(&patient, &file, no_ingest).await?,
        Commands::Ingest {
            patient,
            text,
            category,
        } => commands::ingest::run(&patient, &text, &category).await?,
    }

    Ok(())
}
