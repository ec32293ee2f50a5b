//! learnflux CLI - Command-line interface for the learnflux engine
//!
//! Commands:
//! - analyze: Full analysis of an interaction history
//! - struggle: Real-time struggle assessment for a live session
//! - fatigue: Break recommendation for a live session
//! - mastery: Update a mastery map and rank practice
//! - difficulty: Adjust difficulty from recent lesson outcomes
//! - ui-settings: Suggest accessibility settings
//! - gamification: Summarize gamification preferences
//! - engagement: Predict engagement with a content item
//! - insights: Learning insights from a history
//! - config: Print the effective configuration
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use learnflux::{ComputeError, EngineConfig, LearningEngine, PRODUCER_NAME, VERSION};

/// learnflux - Behavioral analytics for adaptive learning
#[derive(Parser)]
#[command(name = "learnflux")]
#[command(version = VERSION)]
#[command(about = "Turn learning interactions into adaptive learning signals", long_about = None)]
struct Cli {
    /// Engine configuration file (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Request input shared by every engine command
#[derive(clap::Args)]
struct RequestArgs {
    /// Request file path (use - for stdin)
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an interaction history: features, prediction, patterns, learning path
    Analyze(RequestArgs),

    /// Assess struggle in a live session
    Struggle(RequestArgs),

    /// Estimate fatigue and recommend a break
    Fatigue(RequestArgs),

    /// Update a mastery map with one interaction and rank practice
    Mastery(RequestArgs),

    /// Adjust difficulty from recent lesson outcomes
    Difficulty(RequestArgs),

    /// Suggest accessibility settings from interface behavior
    UiSettings(RequestArgs),

    /// Summarize responses to gamification elements
    Gamification(RequestArgs),

    /// Predict how engaging a content item will be for a learner
    Engagement(RequestArgs),

    /// Derive learning insights from an interaction history
    Insights(RequestArgs),

    /// Print the effective configuration
    Config,

    /// Diagnose configuration and environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so stdout carries only JSON
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliFailure> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Analyze(args) => cmd_engine(config_path, &args, LearningEngine::analyze_json),
        Commands::Struggle(args) => cmd_engine(config_path, &args, LearningEngine::struggle_json),
        Commands::Fatigue(args) => cmd_engine(config_path, &args, LearningEngine::fatigue_json),
        Commands::Mastery(args) => cmd_engine(config_path, &args, LearningEngine::mastery_json),
        Commands::Difficulty(args) => {
            cmd_engine(config_path, &args, LearningEngine::difficulty_json)
        }
        Commands::UiSettings(args) => {
            cmd_engine(config_path, &args, LearningEngine::ui_settings_json)
        }
        Commands::Gamification(args) => {
            cmd_engine(config_path, &args, LearningEngine::gamification_json)
        }
        Commands::Engagement(args) => {
            cmd_engine(config_path, &args, LearningEngine::engagement_json)
        }
        Commands::Insights(args) => cmd_engine(config_path, &args, LearningEngine::insights_json),
        Commands::Config => cmd_config(config_path),
        Commands::Doctor { json } => cmd_doctor(config_path, json),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliFailure> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            EngineConfig::from_file(path).map_err(CliFailure::Config)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn read_input(path: &Path) -> Result<String, CliFailure> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn cmd_engine(
    config_path: Option<&Path>,
    args: &RequestArgs,
    operation: fn(&LearningEngine, &str) -> Result<String, ComputeError>,
) -> Result<(), CliFailure> {
    let engine = LearningEngine::with_config(load_config(config_path)?);
    let request = read_input(&args.input)?;
    if request.trim().is_empty() {
        return Err(CliFailure::EmptyInput);
    }
    debug!(bytes = request.len(), "read request");

    let response = operation(&engine, &request)?;
    if args.pretty {
        let value: serde_json::Value = serde_json::from_str(&response)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{response}");
    }
    Ok(())
}

fn cmd_config(config_path: Option<&Path>) -> Result<(), CliFailure> {
    let config = load_config(config_path)?;
    println!("{}", config.to_json()?);
    Ok(())
}

fn cmd_doctor(config_path: Option<&Path>, json: bool) -> Result<(), CliFailure> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("learnflux version {VERSION}"),
    });

    // Configuration
    let engine = match config_path {
        Some(path) if !path.exists() => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Configuration file does not exist, using defaults".to_string(),
            });
            LearningEngine::default()
        }
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => {
                checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!("Configuration file valid ({})", path.display()),
                });
                LearningEngine::with_config(config)
            }
            Err(e) => {
                checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid configuration: {e}"),
                });
                LearningEngine::default()
            }
        },
        None => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: "Using built-in defaults".to_string(),
            });
            LearningEngine::default()
        }
    };

    let models = engine.model_status();
    checks.push(DoctorCheck {
        name: "models".to_string(),
        status: CheckStatus::Ok,
        message: format!(
            "pattern classifier: {}, performance regressor: {}",
            model_label(models.pattern_classifier_loaded),
            model_label(models.performance_regressor_loaded)
        ),
    });

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready for requests)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("learnflux Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(CliFailure::DoctorFailed)
    } else {
        Ok(())
    }
}

fn model_label(loaded: bool) -> &'static str {
    if loaded {
        "loaded"
    } else {
        "heuristic fallback"
    }
}

// Error types

#[derive(Debug)]
enum CliFailure {
    Io(io::Error),
    Engine(ComputeError),
    Config(ComputeError),
    Json(serde_json::Error),
    EmptyInput,
    DoctorFailed,
}

impl From<io::Error> for CliFailure {
    fn from(e: io::Error) -> Self {
        CliFailure::Io(e)
    }
}

impl From<ComputeError> for CliFailure {
    fn from(e: ComputeError) -> Self {
        CliFailure::Engine(e)
    }
}

impl From<serde_json::Error> for CliFailure {
    fn from(e: serde_json::Error) -> Self {
        CliFailure::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CliFailure> for CliError {
    fn from(e: CliFailure) -> Self {
        match e {
            CliFailure::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CliFailure::Engine(ComputeError::InvalidHistory(kind)) => CliError {
                code: "INVALID_HISTORY".to_string(),
                message: format!("Interaction history must be a JSON array, got {kind}"),
                hint: Some("Pass \"history\" as a list of interaction records".to_string()),
            },
            CliFailure::Engine(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure the request matches the command's input format".to_string()),
            },
            CliFailure::Config(e) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'learnflux config' to see the expected layout".to_string()),
            },
            CliFailure::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            CliFailure::EmptyInput => CliError {
                code: "EMPTY_INPUT".to_string(),
                message: "No request found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            CliFailure::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
