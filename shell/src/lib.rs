//! Commands and screen text for the licgate shell.

use clap::Subcommand;
use licgate_license::{
    AccessGate, GateState, LicenseSession, RECORD_DATE_FORMAT, Rendering, Route,
};
use std::sync::Arc;

/// Shell subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the license state
    Status,
    /// Enter a license key
    Activate {
        /// License key as issued
        key: String,
    },
    /// Navigate to a screen (e.g. "/", "/xls", "/license")
    Open {
        /// Route path
        path: String,
    },
}

/// Text to print and whether the command achieved what was asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Lines to print, without a trailing newline.
    pub text: String,
    /// Whether the command got the user where they asked to go.
    pub success: bool,
}

impl Report {
    fn ok(text: impl Into<String>) -> Self {
        Self { text: text.into(), success: true }
    }

    fn failed(text: impl Into<String>) -> Self {
        Self { text: text.into(), success: false }
    }
}

/// Runs one command, mounting a gate that starts the session's startup load.
pub async fn execute(session: &Arc<LicenseSession>, command: &Command) -> anyhow::Result<Report> {
    let mut gate = AccessGate::new(session);
    session.wait_until_settled().await;
    gate.current();

    let report = match command {
        Command::Status => status(session),
        Command::Activate { key } => {
            gate.navigate(Route::License);
            match session.submit(key).await {
                Ok(outcome) => {
                    let text = format!("{}\n{}", outcome.message(), describe(gate.current()));
                    if session.state() == GateState::Valid {
                        Report::ok(text)
                    } else {
                        Report::failed(text)
                    }
                }
                Err(e) => Report::failed(e.user_message()),
            }
        }
        Command::Open { path } => {
            let route: Route = path.parse()?;
            let rendering = gate.navigate(route);
            let mut text = describe(rendering);
            if !gate.menu().is_empty() {
                let entries: Vec<&str> = gate.menu().iter().map(Route::path).collect();
                text.push_str(&format!("\nmenu: {}", entries.join(" ")));
            }
            Report {
                success: rendering == Rendering::Screen(route),
                text,
            }
        }
    };
    Ok(report)
}

fn status(session: &LicenseSession) -> Report {
    let snap = session.snapshot();
    let mut text = format!("license: {}", snap.state);
    if let Some(date) = snap.validation_date {
        let label = match snap.state {
            GateState::Expired => "expired on",
            _ => "valid until",
        };
        text.push_str(&format!(" ({label} {})", date.format(RECORD_DATE_FORMAT)));
    }
    if snap.state == GateState::Valid {
        Report::ok(text)
    } else {
        Report::failed(text)
    }
}

/// One-line description of what the window would show.
pub fn describe(rendering: Rendering) -> String {
    match rendering {
        Rendering::Waiting => "loading...".to_string(),
        Rendering::Screen(route) => format!("screen {route}"),
        Rendering::Redirect(route) => format!("redirected to {route}"),
        Rendering::ExpiredNotice { expired_on: Some(date) } => format!(
            "license expired on {}. Contact the system administrator.",
            date.format(RECORD_DATE_FORMAT)
        ),
        Rendering::ExpiredNotice { expired_on: None } => {
            "license expired. Contact the system administrator.".to_string()
        }
    }
}
