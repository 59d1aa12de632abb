//! The `examprep` binary: take, validate, show and init.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "examprep", version, about = "Timed practice exams from a question bank")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sit a timed exam
    Take {
        /// Question bank: .json/.toml file, directory, or http(s) URL
        #[arg(long)]
        bank: Option<String>,

        /// Candidate name
        #[arg(long)]
        name: String,

        /// Student ID recorded with the result
        #[arg(long)]
        student_id: Option<String>,

        /// Confirm the work is your own
        #[arg(long)]
        agree_honor_code: bool,

        /// Number of questions to draw
        #[arg(long)]
        questions: Option<usize>,

        /// Time limit in minutes
        #[arg(long)]
        minutes: Option<u64>,

        /// Seed for the question shuffle
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, all, none
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a question bank
    Validate {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Show a saved exam record
    Show {
        /// Record JSON written by `take`
        #[arg(long)]
        record: PathBuf,

        /// Output format: text, markdown, json, html
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and sample question bank
    Init,
}

#[tokio::main]
async fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["examprep=info", "examprep_core=info", "examprep_sources=info"] {
        filter = filter.add_directive(directive.parse().unwrap());
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            bank,
            name,
            student_id,
            agree_honor_code,
            questions,
            minutes,
            seed,
            output,
            format,
            config,
        } => {
            commands::take::execute(commands::take::TakeArgs {
                bank,
                name,
                student_id,
                agree_honor_code,
                questions,
                minutes,
                seed,
                output,
                format,
                config,
            })
            .await
        }
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Show { record, format } => commands::show::execute(record, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
