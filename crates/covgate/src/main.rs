#![forbid(unsafe_code)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use covgate_core::config::{Config, MetricConfig};
use covgate_core::report::MetricsReport;
use covgate_core::types::{MetricKind, SeverityTier};
use covgate_engine::acceptable;
use covgate_engine::context::assembler::ContextAssembler;
use covgate_engine::gates::{ActionVerdict, GateEvaluator};
use covgate_engine::platform::actions::ActionsClient;
use covgate_engine::platform::env::ProcessEnvironment;
use covgate_engine::tier;

#[derive(Parser)]
#[command(
    name = "covgate",
    version,
    about = "Gate CI actions on run conditions and judge coverage metrics."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Evaluate an `if` condition against the current GitHub Actions run.
    CheckIf {
        /// Condition, e.g. `is_default_branch && github.event_name == 'push'`.
        expression: String,

        /// Repository as owner/repo (default: env GITHUB_REPOSITORY).
        #[arg(long)]
        repository: Option<String>,

        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check a metrics report against acceptable thresholds.
    Acceptable {
        /// Metrics report JSON.
        #[arg(long)]
        report: String,

        /// Config file providing thresholds.
        #[arg(long)]
        config: Option<String>,

        /// Coverage threshold, e.g. `80%`.
        #[arg(long)]
        coverage_threshold: Option<String>,

        /// Code to test ratio threshold, e.g. `1:1.2`.
        #[arg(long)]
        ratio_threshold: Option<String>,

        /// Test execution time threshold, e.g. `5m`.
        #[arg(long)]
        time_threshold: Option<String>,

        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the badge color tier for a metric value.
    Tier {
        /// Coverage percentage.
        #[arg(long, conflicts_with_all = ["ratio", "time_ns"])]
        coverage: Option<f64>,

        /// Code to test ratio.
        #[arg(long, conflicts_with = "time_ns")]
        ratio: Option<f64>,

        /// Test execution time in nanoseconds.
        #[arg(long)]
        time_ns: Option<f64>,

        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// Decide every gated action in a config file.
    Gates {
        /// Config file.
        #[arg(long)]
        config: String,

        /// Repository as owner/repo (default: config, then env GITHUB_REPOSITORY).
        #[arg(long)]
        repository: Option<String>,

        /// Output JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::CheckIf {
            expression,
            repository,
            json,
        } => cmd_check_if(&expression, repository, json),

        Cmd::Acceptable {
            report,
            config,
            coverage_threshold,
            ratio_threshold,
            time_threshold,
            json,
        } => cmd_acceptable(
            &report,
            config.as_deref(),
            [coverage_threshold, ratio_threshold, time_threshold],
            json,
        ),

        Cmd::Tier {
            coverage,
            ratio,
            time_ns,
            json,
        } => cmd_tier(coverage, ratio, time_ns, json),

        Cmd::Gates {
            config,
            repository,
            json,
        } => cmd_gates(&config, repository, json),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// `--repository`, then the config's `repository`, then `GITHUB_REPOSITORY`.
/// Blank values at any level fall through to the next source.
fn resolve_repository(flag: Option<String>, config: Option<&Config>) -> String {
    let non_blank = |r: &String| !r.trim().is_empty();
    flag.filter(non_blank)
        .or_else(|| config.and_then(|c| c.repository.clone()).filter(non_blank))
        .or_else(|| std::env::var("GITHUB_REPOSITORY").ok().filter(non_blank))
        .unwrap_or_default()
}

fn gate_evaluator(repository: String) -> GateEvaluator<ActionsClient, ProcessEnvironment> {
    debug!(repository = %repository, "using GitHub Actions environment");
    GateEvaluator::new(ContextAssembler::new(
        ActionsClient::from_env(),
        ProcessEnvironment,
        repository,
    ))
}

fn cmd_check_if(expression: &str, repository: Option<String>, json_out: bool) -> Result<()> {
    let gate = gate_evaluator(resolve_repository(repository, None));
    let result = gate.check_if(expression)?;

    if json_out {
        let output = serde_json::json!({
            "condition": expression,
            "result": result,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{result}");
    }

    if !result {
        bail!("the condition in the `if` section is not met ({expression})");
    }
    Ok(())
}

fn cmd_acceptable(
    report_path: &str,
    config_path: Option<&str>,
    overrides: [Option<String>; 3],
    json_out: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let [coverage, ratio, time] = overrides;
    let metric = |acceptable: String| Some(MetricConfig { acceptable });
    if let Some(t) = coverage {
        config.coverage = metric(t);
    }
    if let Some(t) = ratio {
        config.code_to_test_ratio = metric(t);
    }
    if let Some(t) = time {
        config.test_execution_time = metric(t);
    }

    let report = MetricsReport::load(report_path)?;
    let outcome = acceptable::check_report(&config, &report);

    if json_out {
        let output = serde_json::json!({
            "acceptable": outcome.is_ok(),
            "error": outcome.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if outcome.is_ok() {
        for kind in [
            MetricKind::Coverage,
            MetricKind::CodeToTestRatio,
            MetricKind::TestExecutionTime,
        ] {
            if let (Some(t), Some(v)) = (config.threshold(kind), report.value(kind)) {
                eprintln!("  ok  {kind}: {v} (accepted {t})");
            }
        }
    }

    outcome.with_context(|| format!("{report_path}: not acceptable"))
}

fn cmd_tier(
    coverage: Option<f64>,
    ratio: Option<f64>,
    time_ns: Option<f64>,
    json_out: bool,
) -> Result<()> {
    let (kind, value) = match (coverage, ratio, time_ns) {
        (Some(v), _, _) => (MetricKind::Coverage, v),
        (_, Some(v), _) => (MetricKind::CodeToTestRatio, v),
        (_, _, Some(v)) => (MetricKind::TestExecutionTime, v),
        _ => bail!("one of --coverage, --ratio or --time-ns is required"),
    };
    let severity: SeverityTier = tier::tier(kind, value);

    if json_out {
        let output = serde_json::json!({
            "metric": kind,
            "value": value,
            "tier": severity,
            "color": severity.hex(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{severity} {}", severity.hex());
    }
    Ok(())
}

fn cmd_gates(config_path: &str, repository: Option<String>, json_out: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let gate = gate_evaluator(resolve_repository(repository, Some(&config)));
    let decisions = gate
        .decide(&config)
        .with_context(|| format!("cannot evaluate gates in {config_path}"))?;

    if json_out {
        println!("{}", serde_json::to_string_pretty(&decisions)?);
        return Ok(());
    }
    for d in &decisions {
        match &d.verdict {
            ActionVerdict::Run => println!(
                "  run   {} ({})",
                d.action,
                d.condition.as_deref().filter(|c| !c.is_empty()).unwrap_or("always")
            ),
            ActionVerdict::Skip { reason } => println!("  skip  {}: {reason}", d.action),
            ActionVerdict::Disabled => println!("  off   {}", d.action),
        }
    }
    Ok(())
}
