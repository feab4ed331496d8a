// This file is the module declaration file for the `builders` module.
// It declares and makes public all the sub-modules that take part in
// producing an extension build.

// `bundler` module:
// The `BuildConfig` handed to the bundler, the `Bundler` trait, and
// `ViteBundler`, which runs `vite build` as a child process.
pub mod bundler;

// `catalog` module:
// Colors, prompt text, yes/no tokens and the fixed console messages.
pub mod catalog;

// `folder` module:
// Directory listing with include/exclude filename filters.
pub mod folder;

// `orchestrator` module:
// Discovers entry points, runs the bundler, then copies the manifest
// into the output directory.
pub mod orchestrator;

// `reporter` module:
// The `Reporter` trait and `ConsoleReporter`, which prints colored
// messages and clears the screen.
pub mod reporter;
