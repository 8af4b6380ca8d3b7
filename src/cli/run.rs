use crate::config::parse::load_config;
use crate::config::types::Config;
use crate::notify::{Notifier, SendError, SmtpNotifier};
use crate::report::fanout::{run_all, AggregateError};
use crate::report::render::{Document, HtmlRenderer};
use crate::report::transform::{convert, ConvertedReport};
use crate::report::window::{TimeWindow, WindowError};
use crate::vendor::session::{AuthError, VendorSession};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] crate::config::parse::ConfigError),

    #[error("report window error: {0}")]
    Window(#[from] WindowError),

    #[error("mail setup error: {0}")]
    MailSetup(#[source] SendError),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("report fetch failed: {0}")]
    Fetch(#[from] AggregateError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Skip delivery and only print the report
    pub no_email: bool,
    /// Also write the rendered HTML here
    pub html_out: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailOutcome {
    Sent,
    Skipped,
    Failed(String),
}

#[derive(Debug)]
pub struct RunOutcome {
    pub window: TimeWindow,
    pub report: ConvertedReport,
    pub document: Document,
    pub email: EmailOutcome,
}

pub async fn run(config_path: Option<PathBuf>, options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match config_path {
        Some(path) => path,
        None => {
            eprintln!("Error: config not found");
            eprintln!("Searched locations:");
            eprintln!("  ~/.config/afterhours/config.yml");
            eprintln!("  /etc/afterhours/config.yml");
            eprintln!("\nUse --config <path> to specify a config file, or run 'afterhours config init' to generate one.");
            std::process::exit(1);
        }
    };

    run_report(&config_path, &options).await.map_err(|e| e.into())
}

async fn run_report(config_path: &Path, options: &RunOptions) -> Result<(), RunError> {
    info!(config_path = %config_path.display(), "Loading configuration");
    let config = load_config(config_path)?;

    let window = TimeWindow::previous_day_in(
        Utc::now(),
        &config.report.timezone,
        config.report.start_time,
        config.report.end_time,
    )?;

    let notifier = if options.no_email {
        None
    } else {
        Some(SmtpNotifier::new(&config.mail).map_err(RunError::MailSetup)?)
    };

    let run_id = Uuid::new_v4();
    let outcome = execute(&config, window, notifier.as_ref().map(|n| n as &dyn Notifier))
        .instrument(info_span!("report_run", %run_id))
        .await?;

    println!("{}", serde_json::to_string_pretty(&outcome.report)?);

    // The email has already gone out, so a failed copy must not fail the run
    if let Some(path) = &options.html_out {
        match write_html(path, &outcome.document) {
            Ok(()) => info!(path = %path.display(), "Wrote HTML report"),
            Err(e) => error!(path = %path.display(), error = %e, "Error writing HTML report"),
        }
    }

    info!(
        from = %outcome.window.from_wire(),
        to = %outcome.window.to_wire(),
        records = outcome.report.len(),
        email = ?outcome.email,
        "Run complete"
    );

    Ok(())
}

fn write_html(path: &Path, document: &Document) -> Result<(), RunError> {
    std::fs::write(path, &document.html)?;
    Ok(())
}

/// Authenticate, fetch every group, convert, render and (optionally) notify.
///
/// Authentication and fetch failures abort before anything is rendered. A
/// delivery failure is logged and reported in [`RunOutcome::email`] only.
pub async fn execute(
    config: &Config,
    window: TimeWindow,
    notifier: Option<&dyn Notifier>,
) -> Result<RunOutcome, RunError> {
    info!(from = %window.from_wire(), to = %window.to_wire(), "Report window");

    let session = VendorSession::authenticate(&config.vendor).await?;

    let records = run_all(
        Arc::new(session),
        &config.report.groups,
        &window,
        config.report.fetch_timeout,
    )
    .await?;

    let report = convert(records);
    let document = HtmlRenderer::with_threshold(config.report.distance_flag_km).render(&report, &window);

    let email = match notifier {
        None => {
            info!("Email delivery skipped");
            EmailOutcome::Skipped
        }
        Some(notifier) => match notifier.send(&config.report.subject, &document).await {
            Ok(()) => EmailOutcome::Sent,
            Err(e) => {
                error!(error = %e, "Error sending email");
                EmailOutcome::Failed(e.to_string())
            }
        },
    };

    Ok(RunOutcome {
        window,
        report,
        document,
        email,
    })
}
