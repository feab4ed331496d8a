use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Result, bail};
use tempfile::TempDir;
use webext_build::builders::bundler::{BuildConfig, Bundler, BundlerError};
use webext_build::builders::catalog::{self, Palette};
use webext_build::builders::orchestrator::{BuildError, BuildOrchestrator, ScriptBuild};
use webext_build::builders::reporter::Reporter;
use webext_build::core::config::BuildSettings;
use webext_build::core::outcome::Outcome;
use webext_build::core::session::{ConfirmationSession, PromptSource, SessionState};
use webext_build::utils;

/// Answers from a fixed script; records every statement it was shown.
struct ScriptedPrompt {
    answers: VecDeque<String>,
    statements: Vec<String>,
}

impl ScriptedPrompt {
    fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            statements: Vec::new(),
        }
    }
}

impl PromptSource for ScriptedPrompt {
    fn ask(&mut self, statement: &str) -> Result<Option<String>> {
        self.statements.push(statement.to_string());
        Ok(self.answers.pop_front())
    }
}

#[derive(Default)]
struct RecordingReporter {
    lines: RefCell<Vec<(Palette, String)>>,
    clears: Cell<usize>,
}

impl Reporter for RecordingReporter {
    fn line(&self, palette: Palette, text: &str) {
        self.lines.borrow_mut().push((palette, text.to_string()));
    }

    fn segments(&self, parts: &[(Palette, &str)]) {
        let mut lines = self.lines.borrow_mut();
        for (palette, text) in parts {
            lines.push((*palette, text.to_string()));
        }
    }

    fn clear(&self) {
        self.clears.set(self.clears.get() + 1);
        self.lines.borrow_mut().push((Palette::Reset, "<clear>".to_string()));
    }
}

/// Writes one `.mjs` per input the way the real bundler would, or fails.
#[derive(Default)]
struct FakeBundler {
    calls: Cell<usize>,
    fail: bool,
    last_config: RefCell<Option<BuildConfig>>,
}

impl FakeBundler {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl Bundler for FakeBundler {
    fn build(&self, config: &BuildConfig) -> Result<(), BundlerError> {
        self.calls.set(self.calls.get() + 1);
        *self.last_config.borrow_mut() = Some(config.clone());
        if self.fail {
            return Err(BundlerError::NoCommand);
        }

        let out_dir = config.root.join(&config.build.out_dir);
        for name in config.build.rollup_options.input.keys() {
            let target = out_dir.join(format!("{name}.mjs"));
            fs::create_dir_all(target.parent().unwrap()).unwrap();
            fs::write(target, "export {};\n").unwrap();
        }
        fs::write(out_dir.join("service-worker.mjs"), "export {};\n").unwrap();
        Ok(())
    }
}

fn setup_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    for module in ["popup", "service-worker"] {
        fs::create_dir_all(src.join(module)).unwrap();
        fs::write(src.join(module).join("index.mts"), "export {};\n").unwrap();
    }
    fs::write(src.join("manifest.json"), "{\"manifest_version\": 3}\n").unwrap();
    dir
}

fn orchestrator<'a>(
    root: &Path,
    bundler: FakeBundler,
    reporter: &'a RecordingReporter,
) -> BuildOrchestrator<'a, FakeBundler> {
    BuildOrchestrator::new(root.to_path_buf(), BuildSettings::default(), bundler, reporter)
}

fn session<'a>(answers: &[&str], reporter: &'a RecordingReporter) -> ConfirmationSession<'a, ScriptedPrompt> {
    ConfirmationSession::new(ScriptedPrompt::new(answers), reporter, Duration::ZERO)
}

#[test]
fn test_yes_answers_build_once() {
    for answer in ["yes", "y", "Yes", "Y"] {
        let project = setup_project();
        let reporter = RecordingReporter::default();
        let orchestrator = orchestrator(project.path(), FakeBundler::default(), &reporter);

        let mut session = session(&[answer], &reporter);
        let outcome = session.run(&orchestrator).unwrap();

        assert_eq!(outcome, Outcome::Success, "answer {answer}");
        assert_eq!(orchestrator.bundler().calls.get(), 1, "answer {answer}");
        assert_eq!(session.state(), SessionState::Building);
        assert_eq!(session.answer(), answer);
    }
}

#[test]
fn test_no_answers_deny_without_building() {
    for answer in ["no", "n", "NO", "N"] {
        let project = setup_project();
        let reporter = RecordingReporter::default();
        let orchestrator = orchestrator(project.path(), FakeBundler::default(), &reporter);

        let outcome = session(&[answer], &reporter).run(&orchestrator).unwrap();

        assert_eq!(outcome, Outcome::BuildDenied);
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(orchestrator.bundler().calls.get(), 0);
        assert!(!project.path().join("dist").exists());
    }
}

#[test]
fn test_unrecognized_answers_reprompt_with_retry_phrasing() {
    let project = setup_project();
    let reporter = RecordingReporter::default();
    let orchestrator = orchestrator(project.path(), FakeBundler::default(), &reporter);

    let mut session = session(&["maybe", "", "yesno", "maybe", "n"], &reporter);
    let outcome = session.run(&orchestrator).unwrap();

    assert_eq!(outcome, Outcome::BuildDenied);
    let statements = &session.prompt().statements;
    assert_eq!(statements.len(), 5);
    assert_eq!(statements[0], catalog::statement(false));
    for statement in &statements[1..] {
        assert_eq!(statement, &catalog::statement(true));
    }
    assert_eq!(reporter.clears.get(), 4);
    let retries = reporter
        .lines
        .borrow()
        .iter()
        .filter(|(_, text)| text == catalog::MISTAKE_TRY_AGAIN)
        .count();
    assert_eq!(retries, 4);
}

#[test]
fn test_unrecognized_answer_leaves_session_waiting() {
    let reporter = RecordingReporter::default();
    let mut session = session(&[], &reporter);

    assert_eq!(session.state(), SessionState::AwaitingAnswer { retry: false });
    assert_eq!(
        session.set_answer("perhaps".to_string()),
        SessionState::AwaitingAnswer { retry: true }
    );
    assert_eq!(session.set_answer("Y".to_string()), SessionState::Building);
}

#[test]
fn test_closed_input_is_a_denial() {
    let project = setup_project();
    let reporter = RecordingReporter::default();
    let orchestrator = orchestrator(project.path(), FakeBundler::default(), &reporter);

    let outcome = session(&[], &reporter).run(&orchestrator).unwrap();

    assert_eq!(outcome, Outcome::BuildDenied);
    assert_eq!(orchestrator.bundler().calls.get(), 0);
}

#[test]
fn test_end_to_end_build() {
    let project = setup_project();
    let root = project.path();
    let reporter = RecordingReporter::default();
    let orchestrator = orchestrator(root, FakeBundler::default(), &reporter);

    let outcome = session(&["y"], &reporter).run(&orchestrator).unwrap();
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(outcome.exit_code(), 0);

    let config = orchestrator.bundler().last_config.borrow().clone().unwrap();
    let input = &config.build.rollup_options.input;
    assert_eq!(
        input.keys().cloned().collect::<Vec<_>>(),
        vec!["src/popup/index", "src/service-worker/index"]
    );
    assert_eq!(input["src/popup/index"], root.join("src/popup/index.mts"));
    assert_eq!(config.build.lib.entry, root.join("src/service-worker/index.mts"));

    let dist = root.join("dist");
    assert!(dist.join("src/popup/index.mjs").is_file());
    assert!(dist.join("service-worker.mjs").is_file());
    assert_eq!(
        fs::read_to_string(dist.join("manifest.json")).unwrap(),
        "{\"manifest_version\": 3}\n"
    );

    let lines = reporter.lines.borrow();
    assert_eq!(lines.first().unwrap(), &(Palette::Blue, catalog::BUILD_START.to_string()));
    assert_eq!(lines.last().unwrap(), &(Palette::Green, catalog::BUILD_FINISHED.to_string()));
}

#[test]
fn test_entry_points_probe_extensions_and_skip_files() {
    let project = setup_project();
    let src = project.path().join("src");
    fs::create_dir_all(src.join("options")).unwrap();
    fs::write(src.join("options").join("index.tsx"), "export {};\n").unwrap();
    fs::create_dir_all(src.join("assets")).unwrap();
    fs::write(src.join("README.md"), "notes\n").unwrap();

    let reporter = RecordingReporter::default();
    let orchestrator = orchestrator(project.path(), FakeBundler::default(), &reporter);
    let input = orchestrator.entry_points().unwrap();

    assert_eq!(input.len(), 3);
    assert_eq!(input["src/options/index"], src.join("options").join("index.tsx"));
    assert!(!input.contains_key("src/assets/index"));
    assert!(!input.contains_key("src/README.md/index"));
}

#[test]
fn test_bundler_failure_still_copies_manifest() {
    let project = setup_project();
    let reporter = RecordingReporter::default();
    let orchestrator = orchestrator(project.path(), FakeBundler::failing(), &reporter);

    assert!(matches!(
        orchestrator.compile_js().unwrap(),
        ScriptBuild::BuildFailed(_)
    ));

    let outcome = orchestrator.run_build();
    assert_eq!(outcome, Outcome::Success);
    assert!(project.path().join("dist").join("manifest.json").is_file());

    let expected = catalog::build_error(&BundlerError::NoCommand.to_string());
    assert!(reporter
        .lines
        .borrow()
        .iter()
        .any(|(palette, text)| *palette == Palette::Red && *text == expected));
}

#[test]
fn test_missing_source_folder_stops_build() {
    let project = tempfile::tempdir().unwrap();
    let reporter = RecordingReporter::default();
    let orchestrator = orchestrator(project.path(), FakeBundler::default(), &reporter);

    let outcome = session(&["y"], &reporter).run(&orchestrator).unwrap();

    assert_eq!(outcome, Outcome::EmptyPath);
    assert_eq!(outcome.exit_code(), 3);
    assert_eq!(orchestrator.bundler().calls.get(), 0);
    assert!(!project.path().join("dist").exists());
}

#[test]
fn test_missing_manifest_fails() {
    let project = setup_project();
    fs::remove_file(project.path().join("src").join("manifest.json")).unwrap();
    let reporter = RecordingReporter::default();
    let orchestrator = orchestrator(project.path(), FakeBundler::default(), &reporter);

    assert!(matches!(
        orchestrator.compile_manifest_json(),
        Err(BuildError::ManifestMissing { .. })
    ));
    assert_eq!(orchestrator.run_build(), Outcome::Failure);
}

#[test]
fn test_denial_farewell_only_denied_is_red() {
    let reporter = RecordingReporter::default();
    reporter.farewell(Outcome::BuildDenied);

    let lines = reporter.lines.borrow();
    assert_eq!(reporter.clears.get(), 1);
    assert_eq!(lines[0].1, "<clear>");
    assert_eq!(
        lines[1..].to_vec(),
        vec![
            (Palette::Reset, "You ".to_string()),
            (Palette::Red, "denied".to_string()),
            (Palette::Reset, " create a new build.\n".to_string()),
            (Palette::White, ">>>> See you soon <<<<<".to_string()),
        ]
    );

    let joined: String = lines[1..].iter().map(|(_, text)| text.as_str()).collect();
    assert_eq!(joined, Outcome::BuildDenied.reason());
}

#[test]
fn test_failure_farewells_are_red() {
    for outcome in [Outcome::EmptyPath, Outcome::Failure] {
        let reporter = RecordingReporter::default();
        reporter.farewell(outcome);

        assert_eq!(reporter.clears.get(), 0);
        assert_eq!(
            reporter.lines.borrow().as_slice(),
            &[(Palette::Red, outcome.reason().to_string())]
        );
    }
    assert_eq!(Outcome::EmptyPath.reason(), "The folder is empty");
}

/// A terminal that breaks on the first read.
struct BrokenPrompt;

impl PromptSource for BrokenPrompt {
    fn ask(&mut self, _statement: &str) -> Result<Option<String>> {
        bail!("stdin is not readable")
    }
}

#[test]
fn test_prompt_error_becomes_failure() {
    let project = setup_project();
    let reporter = RecordingReporter::default();
    let orchestrator = orchestrator(project.path(), FakeBundler::default(), &reporter);
    let mut session = ConfirmationSession::new(BrokenPrompt, &reporter, Duration::ZERO);

    let outcome = utils::run_session(&mut session, &orchestrator);

    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(outcome.exit_code(), 2);
    assert_eq!(orchestrator.bundler().calls.get(), 0);
}

#[test]
fn test_settle_keeps_outcomes_and_maps_errors() {
    assert_eq!(utils::settle(Ok(Outcome::BuildDenied)), Outcome::BuildDenied);
    assert_eq!(utils::settle(Ok(Outcome::Success)), Outcome::Success);
    assert_eq!(
        utils::settle(Err(anyhow::anyhow!("config could not be parsed"))),
        Outcome::Failure
    );
}

#[test]
fn test_success_farewell_is_white() {
    let reporter = RecordingReporter::default();
    reporter.farewell(Outcome::Success);

    assert_eq!(reporter.clears.get(), 0);
    assert_eq!(
        reporter.lines.borrow().as_slice(),
        &[(Palette::White, "Good Job and Good Bye!!".to_string())]
    );
}
