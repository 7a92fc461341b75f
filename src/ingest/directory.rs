use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{IngestError, IngestReport, Ingestor};

/// Extension of files picked up by a directory scan.
pub const CSV_EXTENSION: &str = "csv";

/// Optional hints naming a single roster file inside a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadHints {
    /// Team name; whitespace runs become underscores.
    pub team: Option<String>,
    /// Sex code.
    pub sex: Option<String>,
    /// Season year.
    pub year: Option<String>,
}

impl LoadHints {
    /// Hints with all three parts set.
    pub fn new(team: impl Into<String>, sex: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            team: Some(team.into()),
            sex: Some(sex.into()),
            year: Some(year.into()),
        }
    }
}

/// `<team>_<sex>_<year>.csv`, with whitespace runs in the team name turned
/// into underscores. `None` unless all three hints are non-blank.
pub fn expected_file_name(hints: &LoadHints) -> Option<String> {
    let present = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let team = present(&hints.team)?;
    let sex = present(&hints.sex)?;
    let year = present(&hints.year)?;

    let team = team.split_whitespace().collect::<Vec<_>>().join("_");
    Some(format!("{team}_{sex}_{year}.{CSV_EXTENSION}"))
}

/// Loads the file named by `hints` if it exists in `dir`, otherwise every
/// `*.csv` file in `dir` (not recursive, in path order).
///
/// Unreadable files are skipped. Fails with [`IngestError::NoInput`] when no
/// file could be read.
pub fn ingest_directory(dir: impl AsRef<Path>, hints: &LoadHints) -> Result<IngestReport, IngestError> {
    let dir = dir.as_ref();
    let mut ingestor = Ingestor::new();

    if let Some(name) = expected_file_name(hints) {
        let specific = dir.join(&name);
        if specific.is_file() {
            match ingestor.ingest_file(&specific) {
                Ok(_) => return Ok(ingestor.finish()),
                Err(err) => {
                    tracing::warn!(error = %err, "named roster file unreadable, scanning directory");
                }
            }
        } else {
            tracing::debug!(file = %name, dir = %dir.display(), "named roster file absent, scanning directory");
        }
    }

    let mut files_read = 0usize;
    for path in csv_files(dir)? {
        match ingestor.ingest_file(&path) {
            Ok(_) => files_read += 1,
            Err(err) => tracing::warn!(error = %err, "skipping unreadable result file"),
        }
    }

    if files_read == 0 {
        return Err(IngestError::NoInput {
            dir: dir.to_path_buf(),
        });
    }
    Ok(ingestor.finish())
}

fn csv_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let io_err = |source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == CSV_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
