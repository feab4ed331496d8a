use anyhow::{Context, Result};
use env_logger::Env;
use log::{debug, error};
use std::path::PathBuf;

use crate::builders::bundler::{Bundler, ViteBundler};
use crate::builders::orchestrator::BuildOrchestrator;
use crate::builders::reporter::Reporter;
use crate::core::config::ConfigManager;
use crate::core::outcome::Outcome;
use crate::core::session::{ConfirmationSession, PromptSource, TerminalPrompt};

/// Sets up `env_logger`. `RUST_LOG` wins over the `-v` count.
pub fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();
    debug!("Verbosity level: {verbose} (log level: {log_level})");
}

/// Runs one interactive session against the project at `root` (or the
/// discovered root when `None`).
pub fn run_interactive(
    root: Option<PathBuf>,
    config: Option<PathBuf>,
    reporter: &dyn Reporter,
) -> Result<Outcome> {
    let mut config_manager = match root {
        Some(root) => ConfigManager::new_at(root),
        None => ConfigManager::new().context("Failed to resolve the current directory")?,
    };
    if let Some(path) = config {
        config_manager.set_config_path(path);
    }

    let settings = config_manager.load_settings()?;
    let project_root = config_manager.get_project_root().to_path_buf();
    debug!("Project root: {}", project_root.display());
    debug!("Settings: {settings:?}");

    let retry_delay = settings.retry_delay();
    let bundler = ViteBundler::new(settings.bundler_command.clone());
    let orchestrator = BuildOrchestrator::new(project_root, settings, bundler, reporter);

    let mut session = ConfirmationSession::new(TerminalPrompt, reporter, retry_delay);
    Ok(run_session(&mut session, &orchestrator))
}

/// Drives `session` to an outcome; a prompt or terminal error becomes `Failure`.
pub fn run_session<P: PromptSource, B: Bundler>(
    session: &mut ConfirmationSession<'_, P>,
    orchestrator: &BuildOrchestrator<'_, B>,
) -> Outcome {
    settle(session.run(orchestrator))
}

/// Collapses a fallible run into the outcome the process exits with.
pub fn settle(result: Result<Outcome>) -> Outcome {
    match result {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{e:#}");
            Outcome::Failure
        }
    }
}
