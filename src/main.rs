use std::sync::Arc;

use clap::{Parser, Subcommand};
use mantra_attempt::{
    gateway::{Gateway, MockTestSummary, ScoreRecord},
    run_attempt, telemetry, AppError, AttemptRequest, HttpGateway, Settings, TestKind,
};

#[derive(Parser, Debug)]
#[command(version, about = "Timed Mantra IAS mock-test attempts in the terminal", long_about = None)]
struct Cli {
    /// Backend base URL (overrides MANTRA_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// User taking the test (overrides MANTRA_USER_ID)
    #[arg(long, global = true)]
    user_id: Option<u64>,

    /// Bearer token (overrides MANTRA_API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available mock tests
    Tests {
        #[arg(long, value_enum, default_value_t = TestKind::Paid)]
        kind: TestKind,
    },
    /// Take a timed attempt of a mock test
    Attempt {
        #[arg(long)]
        test_id: u64,

        #[arg(long, value_enum, default_value_t = TestKind::Paid)]
        kind: TestKind,
    },
    /// Show the user's saved scores
    Scores,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let settings = Settings::from_env()?
        .with_base_url(cli.base_url)
        .with_token(cli.token)
        .with_user_id(cli.user_id);

    let _guard = telemetry::init_tracing(&settings)?;
    let gateway = Arc::new(HttpGateway::from_settings(&settings)?);

    match cli.command {
        Command::Tests { kind } => {
            let tests = gateway.list_tests(kind).await?;
            print_tests(kind, &tests);
        }
        Command::Attempt { test_id, kind } => {
            let request = AttemptRequest {
                mock_test_id: test_id,
                kind,
                user_id: settings.user_id()?,
            };
            run_attempt(gateway, request, settings.bands()).await?;
        }
        Command::Scores => {
            let scores = gateway.user_scores(settings.user_id()?).await?;
            print_scores(&scores);
        }
    }

    Ok(())
}

fn print_tests(kind: TestKind, tests: &[MockTestSummary]) {
    if tests.is_empty() {
        println!("No {} mock tests available.", kind);
        return;
    }

    println!("{:>6}  {:<48}  {:>8}", "ID", "NAME", "MINUTES");
    for test in tests {
        println!("{:>6}  {:<48}  {:>8}", test.id, test.name, test.timer_in_minutes);
    }
}

fn print_scores(scores: &[ScoreRecord]) {
    if scores.is_empty() {
        println!("No scores recorded yet.");
        return;
    }

    println!("{:>6}  {:<48}  {:>7}  {}", "TEST", "TITLE", "SCORE", "COMPLETED");
    for record in scores {
        println!(
            "{:>6}  {:<48}  {:>6.1}%  {}",
            record.mock_test_id,
            record.mock_test_title,
            record.score,
            record.completed_at.as_deref().unwrap_or("-")
        );
    }
}
