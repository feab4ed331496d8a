use console::Term;
use log::debug;

use crate::builders::catalog::{DENIAL_SEGMENTS, Palette};
use crate::core::outcome::Outcome;

/// Where user-facing console messages go.
///
/// The build and the prompt loop only talk to the terminal through this
/// trait, so tests can record what would have been shown.
pub trait Reporter {
    /// Prints one message in the given color.
    fn line(&self, palette: Palette, text: &str);

    /// Prints one message made of differently colored parts.
    fn segments(&self, parts: &[(Palette, &str)]);

    /// Clears the terminal screen.
    fn clear(&self);

    /// Prints the closing message for `outcome`.
    ///
    /// A denial clears the screen first, with "denied" in red and the
    /// sign-off in white; success is shown in white; every failure is
    /// shown in red.
    fn farewell(&self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.line(Palette::White, outcome.reason()),
            Outcome::BuildDenied => {
                self.clear();
                self.segments(&DENIAL_SEGMENTS);
            }
            Outcome::EmptyPath | Outcome::Failure => self.line(Palette::Red, outcome.reason()),
        }
    }
}

/// Prints to standard output.
pub struct ConsoleReporter {
    term: Term,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn line(&self, palette: Palette, text: &str) {
        println!("{}", palette.paint(text));
    }

    fn segments(&self, parts: &[(Palette, &str)]) {
        let message: String = parts
            .iter()
            .map(|(palette, text)| palette.paint(text).to_string())
            .collect();
        println!("{message}");
    }

    fn clear(&self) {
        // Not a terminal (piped output): nothing to clear.
        if let Err(e) = self.term.clear_screen() {
            debug!("Could not clear screen: {e}");
        }
    }
}
