//! Interactive build helper for a browser-extension project.
//!
//! Asks once (and again until it understands the answer) whether to create
//! a new build. On a yes, every module under `src/` goes through Vite and
//! the manifest is copied into `dist/`. The process exit code says how it
//! ended: 0 built, 1 declined, 2 failed, 3 source folder missing.
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use webext_build::builders::reporter::{ConsoleReporter, Reporter};
use webext_build::utils;

#[derive(Parser)]
#[command(name = "webext-build")]
#[command(version, about = "Interactively build a browser extension with Vite")]
struct Cli {
    /// Project root (defaults to the nearest directory with src/manifest.json)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Settings file (defaults to <root>/webext-build.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose);

    let reporter = ConsoleReporter::new();
    let outcome = utils::settle(utils::run_interactive(cli.root, cli.config, &reporter));

    reporter.farewell(outcome);
    ExitCode::from(outcome.exit_code())
}
