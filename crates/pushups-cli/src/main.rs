use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "pushups-cli", version, about = "Daily push-up tracker bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot with daily reminders
    Run,
    /// Add push-ups to a user's total for today
    Add(commands::add::AddArgs),
    /// Show today's progress for a user
    Progress(commands::progress::ProgressArgs),
    /// Show a user's recent history
    Calendar(commands::calendar::CalendarArgs),
    /// Run one reminder pass now
    Remind(commands::remind::RemindArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Bot token management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pushups_core=info,pushups_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run => commands::run::run().await,
        Commands::Add(args) => commands::add::run(args),
        Commands::Progress(args) => commands::progress::run(args),
        Commands::Calendar(args) => commands::calendar::run(args),
        Commands::Remind(args) => commands::remind::run(args).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth { action } => commands::auth::run(action).await,
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "pushups-cli",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
