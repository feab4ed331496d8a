// This file is the module declaration file for the `core` module.
// It declares the submodules that hold the session-level logic of the
// tool and exposes them to the rest of the crate.

// `config` module:
// Finds the extension project root and loads the optional
// `webext-build.toml` settings file into `BuildSettings`.
pub mod config;

// `outcome` module:
// The ways a session can end (`Outcome`), their exit codes and closing
// messages, plus a total lookup from a raw exit code.
pub mod outcome;

// `session` module:
// The interactive yes/no loop (`ConfirmationSession`) and the
// `PromptSource` trait it reads answers from.
pub mod session;
