//! Named posterior draw matrices exported by an upstream sampler.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use super::types::{MissingDataError, PredictionError};
use crate::input::{DrawMatrix, InputError};

/// Posterior draws keyed by effect name (for example `"fixed"`,
/// `"district_structured"`, `"district_unstructured"`).
#[derive(Debug, Clone, Default)]
pub struct PosteriorDraws {
    effects: BTreeMap<String, DrawMatrix>,
}

impl PosteriorDraws {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_effect(mut self, name: impl Into<String>, draws: DrawMatrix) -> Self {
        self.insert(name, draws);
        self
    }

    /// Store draws for `name`, returning any draws it replaces.
    pub fn insert(&mut self, name: impl Into<String>, draws: DrawMatrix) -> Option<DrawMatrix> {
        self.effects.insert(name.into(), draws)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DrawMatrix> {
        self.effects.get(name)
    }

    /// # Errors
    ///
    /// Returns `MissingDataError::Effect` if no draws are stored under `name`.
    pub fn require(&self, name: &str) -> Result<&DrawMatrix, MissingDataError> {
        self.get(name)
            .ok_or_else(|| MissingDataError::Effect(name.to_string()))
    }

    pub fn effect_names(&self) -> impl Iterator<Item = &str> {
        self.effects.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Load every `*.csv` file in `dir` as one effect named after the file stem.
    ///
    /// # Errors
    ///
    /// Returns `PredictionError` if the directory cannot be listed or any file
    /// fails to parse.
    pub fn from_csv_dir(dir: &Path) -> Result<Self, PredictionError> {
        let io_error = |path: &Path, err: std::io::Error| InputError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|err| io_error(dir, err))? {
            let path = entry.map_err(|err| io_error(dir, err))?.path();
            if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut posterior = Self::new();
        for path in paths {
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let file = File::open(&path).map_err(|err| io_error(&path, err))?;
            let draws = DrawMatrix::from_csv_reader(file)?;
            log::debug!(
                "loaded {} draws x {} columns for effect `{name}`",
                draws.nrows(),
                draws.ncols()
            );
            posterior.insert(name, draws);
        }
        Ok(posterior)
    }
}
