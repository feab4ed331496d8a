use log::trace;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filename filters applied to a folder listing.
///
/// Both filters compare whole file names. `exclude` runs first; `include`,
/// when set, keeps only the names it lists (an empty list keeps nothing).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub exclude: Vec<String>,
    pub include: Option<Vec<String>>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Debug, Error)]
pub enum FolderError {
    #[error("cannot read folder {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Lists the entries directly inside `path`, filtered by `options`.
///
/// Names keep the order the OS hands them back in. Any read error fails
/// the whole call; there is no partial result.
pub fn read_folder(path: &Path, options: &ReadOptions) -> Result<Vec<String>, FolderError> {
    let unreadable = |source| FolderError::Unreadable {
        path: path.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(path).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    trace!("{} lists {:?}", path.display(), names);

    Ok(filter_entries(names, options))
}

/// Applies the exclude/include filters, preserving input order.
pub fn filter_entries(names: Vec<String>, options: &ReadOptions) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| !options.exclude.contains(name))
        .filter(|name| match &options.include {
            Some(include) => include.contains(name),
            None => true,
        })
        .collect()
}
