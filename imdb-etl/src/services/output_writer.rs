//! Output writer: persists relations as CSV artifacts, once per name per session
//!
//! Artifacts are comma-separated with RFC-4180 quoting. The header row is
//! always written, so an empty relation produces a header-only file.
//!
//! Each writer owns its `written_names` registry; a second write of the same
//! name within a session is skipped and reported as such. Nothing is shared
//! between writers, so independent sessions never see each other's names.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{EtlError, EtlResult};
use crate::models::{Relation, TitleRecord};

/// Artifact file extension
pub const ARTIFACT_EXTENSION: &str = "csv";

/// Scope label used in top-percent names when ranking the whole relation
pub const ALL_TYPES_LABEL: &str = "all";

/// Name of the unfiltered whole-relation artifact
pub fn unfiltered_artifact_name() -> String {
    format!("all_types_filtered.{}", ARTIFACT_EXTENSION)
}

/// `{type}_filtered.csv`
pub fn filtered_artifact_name(title_type: &str) -> String {
    format!("{}_filtered.{}", sanitize(title_type), ARTIFACT_EXTENSION)
}

/// `top_{percent}_percent_{type-or-all}.csv`
pub fn top_percent_artifact_name(percent: f64, scope_label: &str) -> String {
    format!(
        "top_{}_percent_{}.{}",
        format_percent(percent),
        sanitize(scope_label),
        ARTIFACT_EXTENSION
    )
}

/// Integral values keep one decimal place (`10.0`), others their shortest form (`12.5`)
pub fn format_percent(percent: f64) -> String {
    if percent.fract() == 0.0 {
        format!("{:.1}", percent)
    } else {
        format!("{}", percent)
    }
}

fn sanitize(part: &str) -> String {
    part.replace(['/', '\\'], "_")
}

/// Outcome of one `write` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub name: String,
    pub path: PathBuf,
    /// Data rows in the artifact (header excluded)
    pub rows: usize,
    /// True when the name was already written this session
    pub skipped: bool,
}

/// Session-scoped artifact writer
#[derive(Debug)]
pub struct OutputWriter {
    output_dir: PathBuf,
    written_names: HashSet<String>,
}

impl OutputWriter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            written_names: HashSet::new(),
        }
    }

    pub fn has_written(&self, name: &str) -> bool {
        self.written_names.contains(name)
    }

    /// Names written so far this session
    pub fn written_count(&self) -> usize {
        self.written_names.len()
    }

    /// Write `relation` to `<output_dir>/<name>` unless already written this session
    pub fn write(&mut self, relation: &Relation, name: &str) -> EtlResult<WriteResult> {
        let path = self.output_dir.join(name);

        if self.has_written(name) {
            debug!(name, "Artifact already written this session, skipping");
            return Ok(WriteResult {
                name: name.to_string(),
                path,
                rows: relation.len(),
                skipped: true,
            });
        }

        imdb_common::config::ensure_dir(&self.output_dir)?;

        let temp_path = self.output_dir.join(format!("{}.tmp", name));
        let written = write_csv(relation, &temp_path)
            .and_then(|_| std::fs::rename(&temp_path, &path).map_err(EtlError::from));
        if let Err(e) = written {
            remove_temp(&temp_path);
            return Err(e);
        }

        self.written_names.insert(name.to_string());
        info!(name, rows = relation.len(), path = %path.display(), "Artifact written");

        Ok(WriteResult {
            name: name.to_string(),
            path,
            rows: relation.len(),
            skipped: false,
        })
    }
}

fn remove_temp(temp_path: &Path) {
    if temp_path.exists() {
        if let Err(e) = std::fs::remove_file(temp_path) {
            warn!("Could not remove {}: {}", temp_path.display(), e);
        }
    }
}

fn write_csv(relation: &Relation, path: &Path) -> EtlResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record(TitleRecord::COLUMNS)?;
    for record in relation.iter() {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
