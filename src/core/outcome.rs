/// The ways a session can end, each with its process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The build ran to completion.
    Success,
    /// The user answered "no" (or closed the input).
    BuildDenied,
    /// A required folder was missing or could not be read.
    EmptyPath,
    /// Any other fatal fault: manifest lookup, manifest copy, terminal I/O.
    Failure,
}

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_BUILD_DENIED: u8 = 1;
pub const EXIT_FAILURE: u8 = 2;
pub const EXIT_EMPTY_PATH: u8 = 3;

impl Outcome {
    pub const ALL: [Outcome; 4] = [
        Outcome::Success,
        Outcome::BuildDenied,
        Outcome::EmptyPath,
        Outcome::Failure,
    ];

    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => EXIT_SUCCESS,
            Self::BuildDenied => EXIT_BUILD_DENIED,
            Self::EmptyPath => EXIT_EMPTY_PATH,
            Self::Failure => EXIT_FAILURE,
        }
    }

    pub const fn reason(self) -> &'static str {
        match self {
            Self::Success => "Good Job and Good Bye!!",
            Self::BuildDenied => "You denied create a new build.\n>>>> See you soon <<<<<",
            Self::EmptyPath => "The folder is empty",
            Self::Failure => "The build could not be completed",
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|outcome| i32::from(outcome.exit_code()) == code)
    }
}

/// Result of looking up a numeric exit code in the outcome table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Farewell {
    Known(Outcome),
    Unknown(i32),
}

impl Farewell {
    pub fn message(&self) -> String {
        match self {
            Farewell::Known(outcome) => outcome.reason().to_string(),
            Farewell::Unknown(code) => format!("Exited with unexpected code {code}"),
        }
    }
}

/// Total lookup: codes outside the table come back as `Farewell::Unknown`.
pub fn farewell_for(code: i32) -> Farewell {
    match Outcome::from_code(code) {
        Some(outcome) => Farewell::Known(outcome),
        None => Farewell::Unknown(code),
    }
}
