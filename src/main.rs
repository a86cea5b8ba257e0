use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use file_pipeline::config::PipelineConfig;
use file_pipeline::logging::init_file_logging;
use file_pipeline::outcome::{StepOutcome, StepStatus};
use file_pipeline::steps::{self, validate::ValidateParams};

/// Project layout bootstrap, text processing, schema validation and
/// backup/restore for a small data folder.
#[derive(Parser, Debug)]
#[command(name = "file-pipeline", version, about)]
struct Cli {
    /// Project root directory (overrides PIPELINE_ROOT).
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Print step outcomes as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the project layout and sample text files.
    Init,
    /// Swapcase raw files into data/processed and write a report.
    Process,
    /// Describe processed files as JSON and validate them against the schema.
    Describe,
    /// Validate a JSON document against a schema.
    Validate(ValidateArgs),
    /// Archive data/ into backups/.
    Backup,
    /// Extract the newest backup into restored_data/.
    Restore,
    /// Run init, process, describe and backup in order.
    Run,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Document to validate (default: output/fileinfo_data.json).
    #[arg(long)]
    document: Option<PathBuf>,

    /// Schema to validate against (default: output/fileinfo_schema.json).
    #[arg(long)]
    schema: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let mut config = match PipelineConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("file-pipeline: configuration error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(root) = cli.root {
        config.root = root;
    }

    let layout = config.layout();
    if let Err(e) = init_file_logging(&layout.log_file()) {
        eprintln!("file-pipeline: cannot open log file: {e}");
        std::process::exit(1);
    }
    tracing::info!(root = %layout.root().display(), command = ?cli.command, "starting");

    let outcomes = match cli.command {
        Commands::Init => vec![steps::init::handle(&config).await],
        Commands::Process => vec![steps::process::handle(&config).await],
        Commands::Describe => vec![steps::describe::handle(&config).await],
        Commands::Validate(args) => {
            let defaults = ValidateParams::defaults(&layout);
            let params = ValidateParams {
                document: args.document.unwrap_or(defaults.document),
                schema: args.schema.unwrap_or(defaults.schema),
            };
            vec![steps::validate::handle(params, &config).await]
        }
        Commands::Backup => vec![steps::backup::handle(&config).await],
        Commands::Restore => vec![steps::restore::handle(&config).await],
        Commands::Run => steps::run_pipeline(&config).await,
    };

    for outcome in &outcomes {
        print_outcome(outcome, cli.json);
    }

    std::process::exit(exit_code(&outcomes));
}

fn print_outcome(outcome: &StepOutcome, json: bool) {
    if json {
        match serde_json::to_string(outcome) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("file-pipeline: cannot serialize outcome: {e}"),
        }
        return;
    }

    for line in &outcome.lines {
        if outcome.is_failed() {
            eprintln!("[{}] {line}", outcome.step);
        } else {
            println!("[{}] {line}", outcome.step);
        }
    }
}

/// Failed outranks invalid; both outrank ok.
fn exit_code(outcomes: &[StepOutcome]) -> i32 {
    let any = |status: StepStatus| outcomes.iter().any(|o| o.status == status);
    if any(StepStatus::Failed) {
        StepStatus::Failed.exit_code()
    } else if any(StepStatus::Invalid) {
        StepStatus::Invalid.exit_code()
    } else {
        StepStatus::Ok.exit_code()
    }
}
