use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

/// Directory (under the project root) where the generated Vite config is written.
const GENERATED_CONFIG_DIR: &str = "node_modules/.cache/webext-build";
const GENERATED_CONFIG_FILE: &str = "vite.config.mjs";

/// Everything the bundler is told about one build.
///
/// Field names serialize in camelCase so the JSON form is a valid Vite
/// inline config.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    pub root: PathBuf,
    pub include: Vec<String>,
    pub esbuild: EsbuildOptions,
    pub build: BuildOptions,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EsbuildOptions {
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    pub ssr: bool,
    pub ssr_manifest: bool,
    pub target: String,
    pub out_dir: String,
    pub empty_out_dir: bool,
    pub minify: bool,
    pub rollup_options: RollupOptions,
    pub lib: LibOptions,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RollupOptions {
    /// Logical output name (`src/<module>/index`) to absolute source path.
    pub input: BTreeMap<String, PathBuf>,
    pub preserve_entry_signatures: String,
    pub output: OutputOptions,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    pub es_module: bool,
    pub preserve_modules: bool,
    pub format: String,
    pub entry_file_names: String,
    pub interop: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LibOptions {
    pub formats: Vec<String>,
    pub entry: PathBuf,
}

/// Source globs the bundler should pick up.
pub const SOURCE_GLOBS: [&str; 7] = [
    "**/*.ts", "**/*.tsx", "**/*.js", "**/*.jsx", "**/*.mjs", "**/*.json", "**/*.mts",
];

impl BuildConfig {
    /// The fixed extension build: ES modules, one output file per input,
    /// unminified, output directory wiped first, plus a library entry for
    /// the service worker.
    pub fn extension(
        root: &Path,
        out_dir: &str,
        input: BTreeMap<String, PathBuf>,
        service_worker_entry: PathBuf,
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            include: SOURCE_GLOBS.iter().map(|glob| glob.to_string()).collect(),
            esbuild: EsbuildOptions {
                log_level: "verbose".to_string(),
            },
            build: BuildOptions {
                ssr: false,
                ssr_manifest: false,
                target: "esnext".to_string(),
                out_dir: out_dir.to_string(),
                empty_out_dir: true,
                minify: false,
                rollup_options: RollupOptions {
                    input,
                    preserve_entry_signatures: "strict".to_string(),
                    output: OutputOptions {
                        es_module: true,
                        preserve_modules: true,
                        format: "es".to_string(),
                        entry_file_names: "[name].mjs".to_string(),
                        interop: "auto".to_string(),
                    },
                },
                lib: LibOptions {
                    formats: vec!["es".to_string()],
                    entry: service_worker_entry,
                },
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum BundlerError {
    #[error("bundler command is empty")]
    NoCommand,
    #[error("failed to write bundler config {}", path.display())]
    WriteConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize bundler config")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("bundler exited with {0}")]
    Exited(ExitStatus),
}

/// The seam to whatever turns entry points into output modules.
pub trait Bundler {
    fn build(&self, config: &BuildConfig) -> Result<(), BundlerError>;
}

/// Runs `vite build` as a child process against a generated config file.
pub struct ViteBundler {
    command: Vec<String>,
}

impl ViteBundler {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    /// Writes `config` as an ES module Vite can load with `--config`.
    fn write_config(&self, config: &BuildConfig) -> Result<PathBuf, BundlerError> {
        let dir = config.root.join(GENERATED_CONFIG_DIR);
        let path = dir.join(GENERATED_CONFIG_FILE);
        let write_error = |source| BundlerError::WriteConfig {
            path: path.clone(),
            source,
        };

        let json = serde_json::to_string_pretty(config)?;
        fs::create_dir_all(&dir).map_err(write_error)?;
        fs::write(&path, format!("export default {json};\n")).map_err(write_error)?;
        Ok(path)
    }
}

impl Bundler for ViteBundler {
    fn build(&self, config: &BuildConfig) -> Result<(), BundlerError> {
        let (program, args) = self.command.split_first().ok_or(BundlerError::NoCommand)?;
        let config_path = self.write_config(config)?;
        debug!("Bundler config written to {}", config_path.display());

        info!("Running {} build", self.command.join(" "));
        let status = Command::new(program)
            .args(args)
            .arg("build")
            .arg("--config")
            .arg(&config_path)
            .current_dir(&config.root)
            .status()
            .map_err(|source| BundlerError::Spawn {
                program: program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(BundlerError::Exited(status))
        }
    }
}
