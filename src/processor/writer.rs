//! Artifact writing for converted files
//!
//! Both artifacts are staged as hidden temporary files inside their target
//! directories and only renamed into place once every staged file is
//! complete. If the error report cannot be put in place the JSON artifact
//! that was just persisted is removed again and any JSON artifact it
//! replaced is moved back, so a caller sees either both new artifacts or
//! the directory as it was.

use crate::config::ConverterConfig;
use crate::error::{ConverterError, Result};
use crate::models::{ErrorEntry, User};

use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempPath};
use tracing::{debug, warn};

/// Paths of the artifacts written for one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub json_path: PathBuf,
    pub error_path: Option<PathBuf>,
}

/// Writes JSON conversions and error reports
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    config: ConverterConfig,
}

impl ArtifactWriter {
    /// Create a writer targeting the configured output directories
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Write `<identifier>.json` and, when `errors` is non-empty, `<identifier>.csv`
    pub fn write_artifacts(
        &self,
        identifier: &str,
        users: &[User],
        errors: &[ErrorEntry],
    ) -> Result<WrittenArtifacts> {
        let json_path = self.config.json_artifact_path(identifier);
        let json_staged = stage_json(&json_path, users)?;

        let error_staged = if errors.is_empty() {
            None
        } else {
            let error_path = self.config.error_artifact_path(identifier);
            let staged = stage_error_table(&error_path, errors)?;
            Some((error_path, staged))
        };

        let previous_json = set_aside(&json_path)?;

        if let Err(e) = persist(json_staged, &json_path) {
            roll_back(&json_path, previous_json);
            return Err(e);
        }
        debug!("Wrote {} users to {}", users.len(), json_path.display());

        let error_path = match error_staged {
            Some((error_path, staged)) => {
                if let Err(e) = persist(staged, &error_path) {
                    roll_back(&json_path, previous_json);
                    return Err(e);
                }
                debug!("Wrote {} error rows to {}", errors.len(), error_path.display());
                Some(error_path)
            }
            None => None,
        };

        // Dropping the set-aside copy deletes the superseded artifact
        drop(previous_json);

        Ok(WrittenArtifacts {
            json_path,
            error_path,
        })
    }
}

/// Move an artifact left by an earlier run out of the way so it can be restored
fn set_aside(target: &Path) -> Result<Option<TempPath>> {
    if !target.exists() {
        return Ok(None);
    }

    let saved = create_staging_file(target)?.into_temp_path();
    fs::rename(target, &saved).map_err(|e| ConverterError::output_write(target, e))?;
    debug!("Set aside existing {}", target.display());
    Ok(Some(saved))
}

/// Undo a partially persisted write of `target`
fn roll_back(target: &Path, previous: Option<TempPath>) {
    let result = match &previous {
        Some(saved) => fs::rename(saved, target),
        None => fs::remove_file(target),
    };

    match result {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound && previous.is_none() => {}
        Err(e) => warn!("Could not roll back {}: {}", target.display(), e),
    }
}

fn stage_json(target: &Path, users: &[User]) -> Result<NamedTempFile> {
    let mut staged = create_staging_file(target)?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        serde_json::to_writer(&mut writer, users)?;
        writer
            .flush()
            .map_err(|e| ConverterError::output_write(target, e))?;
    }
    Ok(staged)
}

fn stage_error_table(target: &Path, errors: &[ErrorEntry]) -> Result<NamedTempFile> {
    let mut staged = create_staging_file(target)?;
    {
        let mut writer = csv::Writer::from_writer(staged.as_file_mut());
        for entry in errors {
            writer.serialize(entry)?;
        }
        writer
            .flush()
            .map_err(|e| ConverterError::output_write(target, e))?;
    }
    Ok(staged)
}

fn create_staging_file(target: &Path) -> Result<NamedTempFile> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    tempfile::Builder::new()
        .prefix(".csvtojson-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| ConverterError::output_write(target, e))
}

fn persist(staged: NamedTempFile, target: &Path) -> Result<()> {
    staged
        .as_file()
        .sync_all()
        .map_err(|e| ConverterError::output_write(target, e))?;

    // Staging files are created owner-only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staged.path(), fs::Permissions::from_mode(0o644))
            .map_err(|e| ConverterError::output_write(target, e))?;
    }

    staged
        .persist(target)
        .map_err(|e| ConverterError::output_write(target, e.error))?;
    Ok(())
}
