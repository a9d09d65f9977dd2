//! dupesweep - duplicate file finder
//!
//! The library is the scanning engine: walk directory trees, narrow files
//! to candidates by a cheap per-mode key, hash the candidates on a
//! cancellable worker pool and resolve the results into duplicate groups.
//! The binary is a thin command-line front end over [`session::ScanSession`].

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod session;
pub mod signal;

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;

use crate::actions::{delete_batch, DeleteMethod};
use crate::cli::{Cli, Commands, DeleteArgs, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::ScanMode;
use crate::error::ExitCode;
use crate::output::{CsvOutput, JsonOutput, ScanSummary, TextOutput};
use crate::progress::Progress;
use crate::session::{CancelToken, ScanRequest, ScanSession};

/// Run the command described by `cli`.
///
/// # Errors
///
/// Returns an error for invalid configuration, a failed scan or a failure
/// writing the results.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    log::debug!("Effective configuration: {:?}", config);

    match cli.command {
        Commands::Scan(args) => run_scan(args, config, cli.quiet),
        Commands::Delete(args) => run_delete(&args),
        Commands::Config => {
            let rendered = config.to_toml()?;
            print!("{rendered}");
            Ok(ExitCode::Success)
        }
    }
}

fn apply_scan_args(mut config: Config, args: &ScanArgs) -> Config {
    if let Some(mode) = args.mode {
        config.mode = ScanMode::from(mode);
    }
    if let Some(workers) = args.workers {
        config.workers = Some(usize::from(workers));
    }
    config.follow_symlinks |= args.follow_symlinks;
    config.skip_hidden |= args.skip_hidden;
    config
        .ignore_patterns
        .extend(args.ignore_patterns.iter().cloned());
    config
}

fn run_scan(args: ScanArgs, config: Config, quiet: bool) -> anyhow::Result<ExitCode> {
    let config = apply_scan_args(config, &args);
    let request = ScanRequest::new(args.roots, config.mode);

    let cancel = CancelToken::new();
    let interrupts = match signal::install_handler() {
        Ok(handler) => {
            handler.watch(&cancel);
            Some(handler)
        }
        Err(e) => {
            log::warn!("{}; Ctrl+C will terminate without a report", e);
            None
        }
    };

    let started = Instant::now();
    let session = ScanSession::with_cancel_token(request, config.scan_options(), cancel);
    let handle = session.handle();
    let report = session.run(Arc::new(Progress::new(quiet)));
    let summary = ScanSummary::new(&report, handle.counters(), started.elapsed());

    if let Some(error) = &report.error {
        anyhow::bail!("Scan failed: {error}");
    }

    let exit_code = if interrupts.as_ref().is_some_and(|h| h.was_interrupted()) {
        ExitCode::Interrupted
    } else if report.duplicates.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => TextOutput::new(&report, &summary)
            .write_to(&mut out)
            .context("Failed to write report")?,
        OutputFormat::Json => JsonOutput::new(&report, &summary, exit_code)
            .write_to(&mut out, true)
            .context("Failed to write JSON report")?,
        OutputFormat::Csv => CsvOutput::new(&report.duplicates)
            .write_to(&mut out)
            .context("Failed to write CSV report")?,
    }
    out.flush()?;

    Ok(exit_code)
}

fn run_delete(args: &DeleteArgs) -> anyhow::Result<ExitCode> {
    let method = if args.permanent {
        DeleteMethod::Permanent
    } else {
        DeleteMethod::Trash
    };
    let batch = delete_batch(&args.paths, method);

    for outcome in &batch.outcomes {
        match (&outcome.message, &outcome.error) {
            (Some(message), _) => println!("{}: {}", outcome.path.display(), message),
            (_, Some(error)) => eprintln!("{}: {}", outcome.path.display(), error),
            _ => {}
        }
    }
    println!("{}", batch.summary());

    if batch.all_succeeded() {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::GeneralError)
    }
}
