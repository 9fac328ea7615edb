use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "muse", version, about = "Academic Muse study companion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pomodoro countdown
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Daily study reminders
    Reminder {
        #[command(subcommand)]
        action: commands::reminder::ReminderAction,
    },
    /// Same-day study sessions
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Weekly study progress
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Explain a topic at an academic level
    Explain(commands::generate::TopicArgs),
    /// Key points, takeaways and resources for a topic
    Keypoints(commands::generate::TopicArgs),
    /// SWOT feedback on your own explanation of a topic
    Evaluate(commands::generate::EvaluateArgs),
    /// Theme preference
    Theme {
        #[command(subcommand)]
        action: commands::theme::ThemeAction,
    },
    /// About Academic Muse
    About,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run reminders and the session sweep in the foreground
    Watch,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MUSE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    if !matches!(cli.command, Commands::About) {
        commands::about::first_run_hint();
    }

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Reminder { action } => commands::reminder::run(action),
        Commands::Session { action } => commands::session::run(action),
        Commands::Progress { action } => commands::progress::run(action),
        Commands::Explain(args) => commands::generate::explain(args),
        Commands::Keypoints(args) => commands::generate::keypoints(args),
        Commands::Evaluate(args) => commands::generate::evaluate(args),
        Commands::Theme { action } => commands::theme::run(action),
        Commands::About => commands::about::run(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Watch => commands::watch::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
