//! Interactive build helper for a browser-extension project.
//!
//! Asks whether to build, bundles each module under `src/` through Vite,
//! and copies the extension manifest into `dist/`.
pub mod builders;
pub mod core;
pub mod utils;
