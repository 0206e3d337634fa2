//! `tripwire` command-line tool.
//!
//! ```text
//! tripwire check   <config> [--profile NAME]
//! tripwire trigger <config> [--profile NAME] --severity EXPR --message TEXT [--log-type TYPE]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tripwire::config::load_config;
use tripwire::observability::logging::{init_logging, DEFAULT_FILTER};
use tripwire::{FileSource, Interceptor, Severity};

#[derive(Parser)]
#[command(name = "tripwire")]
#[command(about = "Inspect fault configurations and dispatch test faults", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file and print the resolved profile
    Check {
        config: PathBuf,
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// Install the interceptor and dispatch one runtime error
    Trigger {
        config: PathBuf,
        #[arg(short, long)]
        profile: Option<String>,
        /// Severity expression, e.g. "USER_WARNING" or "ERROR | FATAL"
        #[arg(short, long, default_value = "USER_ERROR")]
        severity: String,
        #[arg(short, long)]
        message: String,
        /// Mark the fault as log-only under this type
        #[arg(long)]
        log_type: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(DEFAULT_FILTER);

    match cli.command {
        Commands::Check { config, profile } => check(config, profile),
        Commands::Trigger {
            config,
            profile,
            severity,
            message,
            log_type,
        } => trigger(config, profile, &severity, message, log_type),
    }
}

fn check(path: PathBuf, profile: Option<String>) -> ExitCode {
    let config = match load_config(&path, profile.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    println!("profile:     {}", config.profile());
    println!("reporting:   {}", config.reporting_mask().expression());
    println!("exit status: {}", config.exit_status());
    println!("notifiers:");
    for descriptor in config.notifier_descriptors() {
        let log_only = if descriptor.ignore_log_only { " (ignores log-only)" } else { "" };
        println!("  {:<10} {}{}", descriptor.id, descriptor.enabled.expression(), log_only);
    }
    ExitCode::SUCCESS
}

fn trigger(
    path: PathBuf,
    profile: Option<String>,
    severity: &str,
    message: String,
    log_type: Option<String>,
) -> ExitCode {
    let code = match Severity::parse(severity) {
        Ok(code) if !code.is_empty() => code,
        Ok(_) => {
            eprintln!("severity expression selects no flags: {severity:?}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("invalid severity {severity:?}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut source = FileSource::new(path);
    if let Some(profile) = profile {
        source = source.with_profile(profile);
    }

    let guard = match Interceptor::builder().config_source(source).install() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(code = %code, "Dispatching test fault");
    let interceptor = guard.interceptor();
    match log_type {
        Some(log_type) => interceptor.log_exception(
            tripwire::RawSignal::RuntimeError {
                code,
                message,
                location: None,
            },
            &log_type,
        ),
        None => {
            interceptor.trigger(code, message);
        }
    }

    drop(guard);
    ExitCode::SUCCESS
}
