use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use rerooter::commands::{self, SyncOptions};
use rerooter::config::{load_config, Cli, LogLevel};
use rerooter::ui::{render_console_report, ReportOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over `--log-level`.
fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.filter_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let base = load_config(cli.mapconfig.as_deref()).context("loading --mapconfig")?;
    let config = base
        .merged(cli.overrides()?)
        .context("applying command-line overrides")?;

    let (src_root, dst_root) = resolve_roots(config.source.clone(), config.target.clone());

    let dry_run = cli.dry_run();
    let options = SyncOptions {
        dry_run,
        syncback: cli.syncback,
        show_progress: cli.log_level > LogLevel::Summary,
    };
    let report = commands::run(&src_root, &dst_root, &config, options)?;

    println!(
        "{}",
        render_console_report(
            &report,
            &ReportOptions {
                dry_run,
                use_color: !cli.no_color,
                level: cli.log_level,
            },
        )
    );

    if let Some(path) = &cli.report_json {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing report to {}", path.display()))?;
    }

    Ok(ExitCode::from(report.exit_code()))
}

/// Both roots must be known and the source must be a directory; otherwise
/// this is a usage error and the process exits.
fn resolve_roots(source: Option<PathBuf>, target: Option<PathBuf>) -> (PathBuf, PathBuf) {
    let mut cmd = Cli::command();
    let Some(source) = source else {
        cmd.error(
            ErrorKind::MissingRequiredArgument,
            "missing source path: pass --src or set 'source' in --mapconfig",
        )
        .exit()
    };
    let Some(target) = target else {
        cmd.error(
            ErrorKind::MissingRequiredArgument,
            "missing target path: pass --dst or set 'target' in --mapconfig",
        )
        .exit()
    };
    if !source.is_dir() {
        cmd.error(
            ErrorKind::InvalidValue,
            format!("--src not found or not a directory: {}", source.display()),
        )
        .exit()
    }
    (source, target)
}
