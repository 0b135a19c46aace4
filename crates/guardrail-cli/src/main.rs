//! Guardrail CLI
//!
//! The `guardrail` command scores model-generated guardrail reports against
//! the deterministic oracle.
//!
//! ## Commands
//!
//! - `eval`: run a test corpus through a provider and write the summary
//! - `check`: print the oracle verdict and rule findings for one input
//! - `repair`: recover a JSON object from raw model output
//! - `ruleset`: show the version, hash and thresholds of a ruleset

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use guardrail_core::{
    load_corpus, recover, ComparisonMode, Harness, InputRecord, Oracle, RuleSet, Threshold,
    DEFAULT_SUMMARY_PATH,
};
use guardrail_runtime::{EvaluationRunner, RuntimeConfig};
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, Level};

mod telemetry;

const DEFAULT_RULESET_PATH: &str = "rulesets/v1.json";

#[derive(Parser)]
#[command(name = "guardrail")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deterministic scoring of guardrail reports", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a test corpus and write a summary report
    Eval {
        /// Test corpus (JSON lines)
        #[arg(long)]
        tests: PathBuf,

        /// Ruleset file; built-in defaults when missing
        #[arg(long, default_value = DEFAULT_RULESET_PATH)]
        ruleset: PathBuf,

        /// Provider type (replay, openai)
        #[arg(long)]
        provider: Option<String>,

        /// Recorded responses for the replay provider (JSON lines)
        #[arg(long)]
        responses: Option<PathBuf>,

        /// Runtime config file (YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Timeout per generation attempt, e.g. "30s"
        #[arg(long, value_parser = humantime::parse_duration)]
        timeout: Option<Duration>,

        /// Comparison mode (advisory, strict)
        #[arg(long)]
        mode: Option<ComparisonMode>,

        /// Summary output path
        #[arg(short, long, default_value = DEFAULT_SUMMARY_PATH)]
        out: PathBuf,

        /// Exit with status 1 when any case fails
        #[arg(long)]
        fail_on_mismatch: bool,
    },

    /// Print the oracle verdict for one input record
    Check {
        /// Input record (JSON)
        input: PathBuf,

        /// Ruleset file; built-in defaults when missing
        #[arg(long, default_value = DEFAULT_RULESET_PATH)]
        ruleset: PathBuf,
    },

    /// Recover a JSON object from raw model output
    Repair {
        /// File to read (default: stdin)
        file: Option<PathBuf>,
    },

    /// Show ruleset version, hash and thresholds
    Ruleset {
        #[arg(default_value = DEFAULT_RULESET_PATH)]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    telemetry::init_tracing(cli.json, level);

    match cli.command {
        Commands::Eval {
            tests,
            ruleset,
            provider,
            responses,
            config,
            timeout,
            mode,
            out,
            fail_on_mismatch,
        } => {
            let overrides = EvalOverrides {
                provider,
                responses,
                timeout,
                mode,
            };
            let failed = cmd_eval(&tests, &ruleset, config.as_deref(), overrides, &out).await?;
            if fail_on_mismatch && failed > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Check { input, ruleset } => cmd_check(&input, &ruleset),
        Commands::Repair { file } => cmd_repair(file.as_deref()),
        Commands::Ruleset { path } => cmd_ruleset(&path),
    }
}

/// Command-line values that take precedence over the config file.
struct EvalOverrides {
    provider: Option<String>,
    responses: Option<PathBuf>,
    timeout: Option<Duration>,
    mode: Option<ComparisonMode>,
}

impl EvalOverrides {
    fn apply(self, config: &mut RuntimeConfig) {
        if let Some(responses) = self.responses {
            if self.provider.is_none() {
                config.provider.kind = "replay".to_string();
            }
            if !config.provider.config.is_object() {
                config.provider.config = json!({});
            }
            config.provider.config["responses"] = json!(responses.display().to_string());
        }
        if let Some(provider) = self.provider {
            config.provider.kind = provider;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(mode) = self.mode {
            config.comparison_mode = mode;
        }
    }
}

async fn cmd_eval(
    tests: &Path,
    ruleset_path: &Path,
    config_path: Option<&Path>,
    overrides: EvalOverrides,
    out: &Path,
) -> Result<usize> {
    let mut config = match config_path {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    overrides.apply(&mut config);

    let ruleset = RuleSet::load(ruleset_path)
        .with_context(|| format!("Failed to load ruleset {}", ruleset_path.display()))?;
    let cases = load_corpus(tests)
        .with_context(|| format!("Failed to load test corpus {}", tests.display()))?;

    let mode = config.comparison_mode;
    let runner = EvaluationRunner::from_config(config).context("Failed to set up provider")?;
    info!(
        provider = runner.provider_name(),
        cases = cases.len(),
        mode = %mode,
        ruleset = %ruleset.info().version,
        "Starting evaluation"
    );

    let outcome = runner.run(Harness::new(ruleset, mode), &cases).await;
    outcome
        .summary
        .write_to(out)
        .with_context(|| format!("Failed to write summary {}", out.display()))?;

    println!(
        "{}",
        serde_json::to_string_pretty(&outcome.summary).context("Failed to render summary")?
    );
    info!(path = %out.display(), "Summary written");
    Ok(outcome.summary.fail)
}

fn cmd_check(input: &Path, ruleset_path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let record = InputRecord::from_json(&text).context("Input is not a valid record")?;
    let ruleset = RuleSet::load(ruleset_path)
        .with_context(|| format!("Failed to load ruleset {}", ruleset_path.display()))?;

    let report = Oracle::standard().evaluate_detailed(&record, &ruleset);
    let output = json!({
        "guardrail_report": report.verdict,
        "findings": report.findings,
        "ruleset": ruleset.info(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_repair(file: Option<&Path>) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    match recover(&text) {
        Ok(recovered) => {
            if recovered.repaired {
                info!("Output needed repair");
            }
            println!("{}", serde_json::to_string_pretty(&recovered.value)?);
            Ok(())
        }
        Err(e) => bail!("{} ({})", e, e.code()),
    }
}

fn cmd_ruleset(path: &Path) -> Result<()> {
    let ruleset = RuleSet::load(path)
        .with_context(|| format!("Failed to load ruleset {}", path.display()))?;

    let thresholds: serde_json::Map<String, Value> = Threshold::ALL
        .iter()
        .map(|t| (t.key().to_string(), json!(ruleset.threshold(*t))))
        .collect();
    let output = json!({
        "ruleset": ruleset.info(),
        "thresholds": thresholds,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
