// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Main entry point for hookwarden
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use hookwarden::advisors;
use hookwarden::config::Config;
use hookwarden::engine::rules::RuleSet;
use hookwarden::engine_core::constants::limits;
use hookwarden::engine_core::dispatcher::Dispatcher;
use hookwarden::engine_core::events::EventKind;
use hookwarden::engine_core::models::HookResponse;
use hookwarden::report::{self, Period};
use hookwarden::sinks::SinkSet;

/// Exit status of `check` when the command would be blocked
const EXIT_DENIED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "hookwarden", version, about, long_about = None)]
struct Cli {
    /// Path to rule set YAML file (overrides HOOKWARDEN_RULES_PATH)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Directory for audit, metrics and notification logs
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Handle one hook event from stdin (the default)
    Hook {
        /// Treat the payload as this event, whatever it says
        #[arg(long)]
        event: Option<String>,
    },
    /// Classify a shell command and print the decision
    Check {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Summarize recorded usage metrics
    Metrics {
        #[arg(long, conflicts_with = "week")]
        today: bool,
        #[arg(long)]
        week: bool,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load, validate and compile a rule set file
    Validate,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    install_panic_hook();

    let mut config = Config::from_env().unwrap_or_else(|e| {
        eprintln!(
            "Warning: Failed to load config from env, using defaults: {}",
            e
        );
        Config::default()
    });

    // CLI flags overlay env
    if let Some(p) = &cli.rules {
        config.rules_path = Some(p.clone());
    }
    if let Some(d) = &cli.state_dir {
        config.state_dir = d.clone();
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to init tracing: {}", e);
    }

    let result = match cli.command.unwrap_or(Command::Hook { event: None }) {
        Command::Hook { event } => {
            // The host must never see a failure from us: stay silent, exit 0
            if let Err(e) = run_hook(config, event).await {
                warn!(error = %e, "Hook invocation failed");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { command } => run_check(&config, &command.join(" ")),
        Command::Metrics { today, week, json } => {
            let period = if today {
                Period::Today
            } else if week {
                Period::Week
            } else {
                Period::All
            };
            run_metrics(&config, period, json)
        }
        Command::Validate => run_validate(&config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_hook(config: Config, event: Option<String>) -> anyhow::Result<()> {
    let override_kind = event.map(|e| e.parse::<EventKind>()).transpose()?;

    let mut stdin = tokio::io::stdin();
    let mut payload = Vec::new();
    (&mut stdin)
        .take(limits::MAX_PAYLOAD_BYTES + 1)
        .read_to_end(&mut payload)
        .await
        .context("reading hook payload")?;

    if payload.len() as u64 > limits::MAX_PAYLOAD_BYTES {
        // Drain so the host never sees a broken pipe
        tokio::io::copy(&mut stdin, &mut tokio::io::sink())
            .await
            .context("draining hook payload")?;
        if let Some(response) = Dispatcher::oversized(&payload, override_kind) {
            write_response(&response).await?;
        }
        return Ok(());
    }

    let rules = Arc::new(config.load_rules()?);
    let dispatcher = Dispatcher::new(rules);
    let record = match dispatcher.dispatch_bytes(&payload, override_kind) {
        Ok(record) => record,
        Err(e) => {
            debug!(error = %e, "Ignoring payload");
            return Ok(());
        }
    };

    let response = match &record.response {
        Some(response) => Some(response.clone()),
        None if !record.is_denied() => advisors::advise(&config, &record).await,
        None => None,
    };

    if let Some(response) = response {
        write_response(&response).await?;
    }

    let sinks = SinkSet::from_config(&config)?;
    if sinks.is_empty() {
        return Ok(());
    }
    let failures = sinks.record_all(&record).await;
    if failures > 0 {
        debug!(failures, total = sinks.len(), "Some sinks failed");
    }
    Ok(())
}

async fn write_response(response: &HookResponse) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut line = response.to_json()?;
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

fn run_check(config: &Config, command: &str) -> anyhow::Result<ExitCode> {
    let rules = config.load_rules()?;
    let decision = rules.evaluator.classify(command);
    println!("{}", serde_json::to_string(&decision)?);

    Ok(if decision.is_deny() {
        ExitCode::from(EXIT_DENIED)
    } else {
        ExitCode::SUCCESS
    })
}

fn run_metrics(config: &Config, period: Period, json: bool) -> anyhow::Result<ExitCode> {
    let since = period.since(chrono::Utc::now());
    let records = report::load_metrics(&config.metrics_log_path(), since)
        .context("reading metrics log")?;
    let summary = report::summarize(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", report::render(summary.as_ref(), period));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_validate(config: &Config) -> anyhow::Result<ExitCode> {
    let path = config
        .rules_path
        .as_ref()
        .context("no rule set given (use --rules or HOOKWARDEN_RULES_PATH)")?;

    // Unlike hook mode, a bad file is an error here rather than a fallback
    let rules = RuleSet::load(path).with_context(|| format!("loading {}", path.display()))?;
    rules.compile().context("validating rule set")?;

    println!(
        "Rule set OK: {} safe prefixes, {} protected files, {} dangerous patterns, {} sensitive keys",
        rules.safe_prefixes.len(),
        rules.protected_files.len(),
        rules.dangerous_patterns.len(),
        rules.sensitive_keys.len()
    );
    Ok(ExitCode::SUCCESS)
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("PANIC: {} at {}", message, location);
    }));
}

// stdout carries the host protocol, so every log line goes to stderr
fn init_tracing(config: &Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        subscriber.json().try_init()?;
    } else {
        subscriber.try_init()?;
    }

    Ok(())
}
