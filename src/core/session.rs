use anyhow::{Context, Result};
use log::{debug, info};
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use crate::builders::bundler::Bundler;
use crate::builders::catalog::{self, Palette, Response};
use crate::builders::orchestrator::BuildOrchestrator;
use crate::builders::reporter::Reporter;
use crate::core::outcome::Outcome;

/// A source of answers to the build question.
pub trait PromptSource {
    /// Shows `statement` and waits for one line. `None` means input ended.
    fn ask(&mut self, statement: &str) -> Result<Option<String>>;
}

/// Reads answers from standard input.
pub struct TerminalPrompt;

impl PromptSource for TerminalPrompt {
    fn ask(&mut self, statement: &str) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{statement}").context("Failed to write prompt")?;
        stdout.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read answer")?;
        if read == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Where the question/answer cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for an answer; `retry` selects the "Hello again" phrasing.
    AwaitingAnswer { retry: bool },
    Building,
    Denied,
}

/// One interactive session: asks until the answer is a yes or a no.
pub struct ConfirmationSession<'a, P: PromptSource> {
    prompt: P,
    reporter: &'a dyn Reporter,
    retry_delay: Duration,
    state: SessionState,
    answer: String,
}

impl<'a, P: PromptSource> ConfirmationSession<'a, P> {
    pub fn new(prompt: P, reporter: &'a dyn Reporter, retry_delay: Duration) -> Self {
        Self {
            prompt,
            reporter,
            retry_delay,
            state: SessionState::AwaitingAnswer { retry: false },
            answer: String::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The most recent answer.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Records a new answer and moves to the state it leads to.
    pub fn set_answer(&mut self, answer: String) -> SessionState {
        let response = Response::classify(&answer);
        debug!("Answer {answer:?} classified as {response:?}");
        self.answer = answer;

        self.state = match response {
            Response::Affirmative => SessionState::Building,
            Response::Negative => SessionState::Denied,
            Response::Unrecognized => SessionState::AwaitingAnswer { retry: true },
        };
        self.state
    }

    /// Asks until the answer is recognized, then builds or declines.
    ///
    /// An unrecognized answer prints a retry hint, waits `retry_delay`,
    /// clears the screen and asks again with the "Hello again" phrasing.
    /// The process is never exited here; the outcome goes back to the caller.
    ///
    /// # Arguments
    /// * `orchestrator`: Runs the build once the answer is a yes.
    ///
    /// # Returns
    /// The build's `Outcome` on a yes, `Outcome::BuildDenied` on a no or when
    /// input ends, or an error if the prompt source fails.
    pub fn run<B: Bundler>(&mut self, orchestrator: &BuildOrchestrator<'_, B>) -> Result<Outcome> {
        loop {
            let SessionState::AwaitingAnswer { retry } = self.state else {
                break;
            };

            let Some(line) = self.prompt.ask(&catalog::statement(retry))? else {
                info!("Input closed, treating as a denial");
                self.state = SessionState::Denied;
                break;
            };

            if let SessionState::AwaitingAnswer { .. } = self.set_answer(line) {
                self.reporter.line(Palette::White, catalog::MISTAKE_TRY_AGAIN);
                thread::sleep(self.retry_delay);
                self.reporter.clear();
            }
        }

        match self.state {
            SessionState::Building => Ok(orchestrator.run_build()),
            _ => Ok(Outcome::BuildDenied),
        }
    }
}
