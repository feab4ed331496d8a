use colored::{ColoredString, Colorize};

/// The fixed set of colors used by console messages.
///
/// Each variant maps onto a terminal foreground color. `Reset` leaves the
/// text in the terminal's default color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Reset,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Palette {
    /// Returns the terminal color behind this palette entry, or `None` for `Reset`.
    pub fn color(self) -> Option<colored::Color> {
        match self {
            Palette::Reset => None,
            Palette::Red => Some(colored::Color::Red),
            Palette::Green => Some(colored::Color::Green),
            Palette::Yellow => Some(colored::Color::Yellow),
            Palette::Blue => Some(colored::Color::Blue),
            Palette::Magenta => Some(colored::Color::Magenta),
            Palette::Cyan => Some(colored::Color::Cyan),
            Palette::White => Some(colored::Color::White),
        }
    }

    /// Paints `text` in this color.
    pub fn paint(self, text: &str) -> ColoredString {
        match self.color() {
            Some(color) => text.color(color),
            None => text.normal(),
        }
    }
}

/// Tokens accepted as a "yes".
pub const YES_TOKENS: [&str; 2] = ["yes", "y"];
/// Tokens accepted as a "no".
pub const NO_TOKENS: [&str; 2] = ["no", "n"];

pub const MISTAKE_TRY_AGAIN: &str =
    "Sorry, I don't understand you. Could you try to response again? Thanks";

pub const BUILD_START: &str = "Start to run build with...";
pub const MANIFEST_START: &str = "Starting to compile manifest...";
pub const BUILD_FINISHED: &str = "✓ Finish build process";

/// The denial farewell split by color: only "denied" is red, and the
/// sign-off line is white. Joined, the parts equal `Outcome::BuildDenied.reason()`.
pub const DENIAL_SEGMENTS: [(Palette, &str); 4] = [
    (Palette::Reset, "You "),
    (Palette::Red, "denied"),
    (Palette::Reset, " create a new build.\n"),
    (Palette::White, ">>>> See you soon <<<<<"),
];

/// How a single answer is understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Affirmative,
    Negative,
    Unrecognized,
}

impl Response {
    /// Classifies an answer by case-insensitive membership in the token sets.
    ///
    /// No trimming happens here: `"yes "` is not a yes.
    pub fn classify(answer: &str) -> Self {
        let answer = answer.to_lowercase();
        if YES_TOKENS.contains(&answer.as_str()) {
            Response::Affirmative
        } else if NO_TOKENS.contains(&answer.as_str()) {
            Response::Negative
        } else {
            Response::Unrecognized
        }
    }
}

/// Renders the build question. `retry` switches to the "Hello again" phrasing.
pub fn statement(retry: bool) -> String {
    let greeting = if retry { "Hello again" } else { "Hello" };
    format!(
        "{greeting}, Do you want to create a new extension build? ({}/{}) ",
        Palette::Green.paint("y"),
        Palette::Red.paint("n"),
    )
}

/// The message printed when the bundler step fails.
pub fn build_error(message: &str) -> String {
    format!("The application has an error {message}")
}
