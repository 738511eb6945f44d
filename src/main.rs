use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobquote::cli::commands;
use jobquote::config::ConfigFormat;

#[derive(Parser)]
#[command(name = "jobquote")]
#[command(
    version,
    about = "AI-assisted construction estimate pricing and line-item suggestions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, short, help = "Listen address, overrides server.bind")]
        bind: Option<String>,
    },

    /// List AI providers in fallback order
    Providers {
        #[arg(long, help = "Print JSON")]
        json: bool,
    },

    /// Suggest priced line items for a job description
    Suggest {
        /// Job description
        description: String,
        #[arg(long, short = 't', help = "Job type, e.g. Kitchen Remodel")]
        job_type: Option<String>,
        #[arg(long, short, help = "Preferred provider id")]
        provider: Option<String>,
        #[arg(long, short = 'f', value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Score how complete a job description is
    Score {
        /// Job description
        description: String,
        #[arg(long, help = "Ask an AI provider instead of scoring locally")]
        ai: bool,
        #[arg(long, short = 'f', value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'f', long, value_enum, default_value = "toml")]
        format: ConfigFormat,
    },
    /// Show configuration file paths
    Path,
    /// Write a starter configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mjobquote encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Serve { bind } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::serve::run(bind))?;
        }
        Commands::Providers { json } => {
            commands::providers::run(json)?;
        }
        Commands::Suggest {
            description,
            job_type,
            provider,
            format,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::suggest::run(commands::suggest::SuggestOptions {
                description,
                job_type,
                provider,
                json: format == OutputFormat::Json,
            }))?;
        }
        Commands::Score {
            description,
            ai,
            format,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::score::run(
                &description,
                ai,
                format == OutputFormat::Json,
            ))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => commands::config::show(format)?,
            ConfigAction::Path => commands::config::path()?,
            ConfigAction::Init { global, force } => commands::config::init(global, force)?,
        },
    }

    Ok(())
}
