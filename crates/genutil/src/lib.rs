//! Shared helpers for the fixture generators.
//!
//! Every generator in this workspace follows the same shape: check whether
//! its output is stale, parse its inputs, and write a generated header. This
//! crate owns the two pieces they share, the staleness check and the atomic
//! header write, so the generator crates only contain their own parsing and
//! emission logic.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

/// Comment line appended after the version marker in every generated header.
pub const DO_NOT_EDIT: &str = "// machine generated, do not edit!";

pub type GenResult<T> = Result<T, GenError>;

/// Errors surfaced by the shared generator plumbing.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    pub fn config(msg: impl Into<String>) -> Self {
        GenError::Config(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}

/// One generator invocation: a declared version plus the input and output
/// paths it reads and writes. Ephemeral, built fresh for every run.
#[derive(Debug)]
pub struct GeneratorTask {
    version: u32,
    inputs: Vec<PathBuf>,
    outputs: Vec<PathBuf>,
}

impl GeneratorTask {
    pub fn new(
        version: u32,
        inputs: impl IntoIterator<Item = PathBuf>,
        outputs: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        Self {
            version,
            inputs: inputs.into_iter().collect(),
            outputs: outputs.into_iter().collect(),
        }
    }

    /// Declared generator version, embedded in output as `// #version:N#`.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the line carrying the version marker for this task.
    pub fn version_marker(&self) -> String {
        format!("// #version:{}#", self.version)
    }

    /// Returns true when any output needs to be regenerated: an output is
    /// missing, an existing output records a different version marker, or
    /// any input is newer than any output.
    pub fn is_dirty(&self) -> GenResult<bool> {
        for out in &self.outputs {
            if !out.exists() {
                log::debug!("{} missing, regenerating", out.display());
                return Ok(true);
            }
            if recorded_version(out)? != Some(self.version) {
                log::debug!("{} version marker stale, regenerating", out.display());
                return Ok(true);
            }
        }
        for input in &self.inputs {
            let in_mtime = mtime(input)?;
            for out in &self.outputs {
                if in_mtime > mtime(out)? {
                    log::debug!(
                        "{} newer than {}, regenerating",
                        input.display(),
                        out.display()
                    );
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

fn mtime(path: &Path) -> GenResult<SystemTime> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|err| GenError::io(path, err))
}

/// Scans the first lines of an existing output file for a `#version:N#`
/// marker and returns the recorded version, if any.
fn recorded_version(path: &Path) -> GenResult<Option<u32>> {
    let file = fs::File::open(path).map_err(|err| GenError::io(path, err))?;
    let reader = BufReader::new(file);
    for line in reader.lines().take(4) {
        let line = line.map_err(|err| GenError::io(path, err))?;
        if let Some(version) = parse_version_marker(&line) {
            return Ok(Some(version));
        }
    }
    Ok(None)
}

fn parse_version_marker(line: &str) -> Option<u32> {
    let rest = &line[line.find("#version:")? + "#version:".len()..];
    rest[..rest.find('#')?].parse().ok()
}

/// Writes `contents` to `path` through a sibling temporary file and an
/// atomic rename, so a failed run never leaves a truncated header behind.
pub fn write_atomic(path: &Path, contents: &str) -> GenResult<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| GenError::config(format!("output path {} has no file name", path.display())))?;
    let tmp = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));
    fs::write(&tmp, contents).map_err(|err| GenError::io(&tmp, err))?;
    fs::rename(&tmp, path).map_err(|err| GenError::io(path, err))?;
    Ok(())
}
