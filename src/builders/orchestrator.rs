use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::builders::bundler::{BuildConfig, Bundler};
use crate::builders::catalog::{self, Palette};
use crate::builders::folder::{FolderError, ReadOptions, read_folder};
use crate::builders::reporter::Reporter;
use crate::core::config::BuildSettings;
use crate::core::outcome::Outcome;

/// How the script-compilation step ended.
///
/// A failed bundler run is reported, not fatal: the manifest copy still runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptBuild {
    Ok,
    BuildFailed(String),
}

/// What a manifest lookup in the source directory found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLookup {
    ExactlyOne(String),
    None,
    Multiple(Vec<String>),
}

impl ManifestLookup {
    pub fn from_listing(mut names: Vec<String>) -> Self {
        match names.len() {
            0 => ManifestLookup::None,
            1 => ManifestLookup::ExactlyOne(names.remove(0)),
            _ => ManifestLookup::Multiple(names),
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Folder(#[from] FolderError),
    #[error("no {name} found in {}", dir.display())]
    ManifestMissing { dir: PathBuf, name: String },
    #[error("expected one manifest in {}, found {}", dir.display(), found.join(", "))]
    ManifestAmbiguous { dir: PathBuf, found: Vec<String> },
    #[error("failed to copy {} to {}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Runs one extension build: scripts through the bundler, then the manifest.
pub struct BuildOrchestrator<'a, B: Bundler> {
    root: PathBuf,
    settings: BuildSettings,
    bundler: B,
    reporter: &'a dyn Reporter,
}

impl<'a, B: Bundler> BuildOrchestrator<'a, B> {
    /// Constructs a new `BuildOrchestrator` for the project at `root`.
    ///
    /// # Arguments
    /// * `root`: The extension project root; `settings` paths are relative to it.
    /// * `settings`: Source/output directory names, manifest name and entry probing.
    /// * `bundler`: The bundler each `compile_js` call hands its `BuildConfig` to.
    /// * `reporter`: Where the colored build-phase messages go.
    pub fn new(
        root: PathBuf,
        settings: BuildSettings,
        bundler: B,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            root,
            settings,
            bundler,
            reporter,
        }
    }

    pub fn bundler(&self) -> &B {
        &self.bundler
    }

    fn source_dir(&self) -> PathBuf {
        self.root.join(&self.settings.source_dir)
    }

    /// Finds `index.<ext>` inside `module_dir`, trying extensions in order.
    fn find_index(&self, module_dir: &Path) -> Option<PathBuf> {
        self.settings
            .entry_extensions
            .iter()
            .map(|ext| module_dir.join(format!("index.{ext}")))
            .find(|candidate| candidate.is_file())
    }

    /// Maps `src/<module>/index` to each module directory's index file.
    pub fn entry_points(&self) -> Result<BTreeMap<String, PathBuf>, FolderError> {
        let source_dir = self.source_dir();
        let options = ReadOptions::new().exclude([self.settings.manifest.as_str()]);
        let mut input = BTreeMap::new();

        for name in read_folder(&source_dir, &options)? {
            let module_dir = source_dir.join(&name);
            if !module_dir.is_dir() {
                debug!("Skipping {}: not a module directory", module_dir.display());
                continue;
            }
            match self.find_index(&module_dir) {
                Some(index) => {
                    input.insert(format!("{}/{name}/index", self.settings.source_dir), index);
                }
                None => warn!("No index file in {}, skipping", module_dir.display()),
            }
        }

        Ok(input)
    }

    /// Bundles every module under the source directory.
    ///
    /// Only an unreadable source directory is an error; a bundler failure
    /// comes back as `ScriptBuild::BuildFailed`.
    pub fn compile_js(&self) -> Result<ScriptBuild, FolderError> {
        let input = self.entry_points()?;
        debug!("Entry points: {input:?}");

        let service_worker_dir = self.source_dir().join(&self.settings.service_worker);
        let service_worker_entry = self
            .find_index(&service_worker_dir)
            .unwrap_or_else(|| service_worker_dir.join("index.mts"));

        let config = BuildConfig::extension(
            &self.root,
            &self.settings.out_dir,
            input,
            service_worker_entry,
        );

        match self.bundler.build(&config) {
            Ok(()) => Ok(ScriptBuild::Ok),
            Err(e) => {
                warn!("Bundler failed: {e}");
                Ok(ScriptBuild::BuildFailed(e.to_string()))
            }
        }
    }

    /// Copies the manifest from the source directory into the output directory.
    pub fn compile_manifest_json(&self) -> Result<PathBuf, BuildError> {
        self.reporter.line(Palette::Green, catalog::MANIFEST_START);

        let source_dir = self.source_dir();
        let options = ReadOptions::new().include([self.settings.manifest.as_str()]);
        let name = match ManifestLookup::from_listing(read_folder(&source_dir, &options)?) {
            ManifestLookup::ExactlyOne(name) => name,
            ManifestLookup::None => {
                return Err(BuildError::ManifestMissing {
                    dir: source_dir,
                    name: self.settings.manifest.clone(),
                });
            }
            // Unreachable with an exact-name filter; kept so every lookup result is handled.
            ManifestLookup::Multiple(found) => {
                return Err(BuildError::ManifestAmbiguous {
                    dir: source_dir,
                    found,
                });
            }
        };

        let out_dir = self.root.join(&self.settings.out_dir);
        let from = source_dir.join(&name);
        let to = out_dir.join(&name);
        let copy_error = |source| BuildError::Copy {
            from: from.clone(),
            to: to.clone(),
            source,
        };

        fs::create_dir_all(&out_dir).map_err(copy_error)?;
        fs::copy(&from, &to).map_err(copy_error)?;
        debug!("Copied {} to {}", from.display(), to.display());
        Ok(to)
    }

    /// Runs the whole build: scripts, then manifest, strictly in that order.
    ///
    /// A bundler failure is reported in red and the manifest is still
    /// copied. Nothing here exits the process.
    ///
    /// # Returns
    /// * `Outcome::Success` once the manifest is in the output directory.
    /// * `Outcome::EmptyPath` if the source directory cannot be read.
    /// * `Outcome::Failure` if the manifest is missing, ambiguous or cannot be copied.
    pub fn run_build(&self) -> Outcome {
        self.reporter.line(Palette::Blue, catalog::BUILD_START);
        info!("Building extension in {}", self.root.display());

        match self.compile_js() {
            Ok(ScriptBuild::Ok) => info!("Scripts bundled"),
            Ok(ScriptBuild::BuildFailed(message)) => {
                self.reporter
                    .line(Palette::Red, &catalog::build_error(&message));
            }
            Err(e) => {
                error!("{e}");
                return Outcome::EmptyPath;
            }
        }

        match self.compile_manifest_json() {
            Ok(_) => {}
            Err(BuildError::Folder(e)) => {
                error!("{e}");
                return Outcome::EmptyPath;
            }
            Err(e) => {
                error!("{e}");
                self.reporter.line(Palette::Red, &e.to_string());
                return Outcome::Failure;
            }
        }

        self.reporter.line(Palette::Green, catalog::BUILD_FINISHED);
        Outcome::Success
    }
}
