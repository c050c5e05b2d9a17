//! Sweep for blobs and records that drifted apart.
//!
//! An upload that fails between the blob write and the snapshot write can
//! leave a blob with no record; a blob removed behind the server's back
//! leaves a record with no blob. The sweep compares the two stores and can
//! remove both kinds of leftovers.
//!
//! Run it while no uploads are in flight (at startup or from the CLI): a
//! blob written a moment before its record is indistinguishable from an
//! orphan.

use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    blob_store::BlobStore,
    error::{PhotoError, Result},
    metadata_store::MetadataStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    Report,
    Prune,
}

impl fmt::Display for SweepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepMode::Report => f.write_str("report"),
            SweepMode::Prune => f.write_str("prune"),
        }
    }
}

impl FromStr for SweepMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "report" => Ok(SweepMode::Report),
            "prune" => Ok(SweepMode::Prune),
            other => Err(format!("unknown sweep mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Blobs with no record.
    pub orphaned_blobs: Vec<String>,
    /// Records whose blob is missing.
    pub dangling_records: Vec<String>,
    pub pruned_blobs: Vec<String>,
    pub pruned_records: Vec<String>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.orphaned_blobs.is_empty() && self.dangling_records.is_empty()
    }
}

pub async fn sweep(
    blobs: &BlobStore,
    metadata: &MetadataStore,
    mode: SweepMode,
) -> Result<SweepReport> {
    let stored: HashSet<String> = blobs.list_names().await?.into_iter().collect();
    let records = metadata.list().await;
    let recorded: HashSet<&str> = records.iter().map(|r| r.filename.as_str()).collect();

    // Decided per record against the filesystem so a record is only
    // dangling when its blob is really gone.
    let mut dangling_records = Vec::new();
    for record in &records {
        if stored.contains(&record.filename) {
            continue;
        }
        match blobs.exists(&record.filename).await {
            Ok(true) => {}
            Ok(false) => dangling_records.push(record.filename.clone()),
            Err(PhotoError::InvalidName(_)) => {
                warn!(filename = %record.filename, "skipping record with unusable filename");
            }
            Err(err) => return Err(err),
        }
    }

    let mut report = SweepReport {
        orphaned_blobs: stored
            .iter()
            .filter(|name| !recorded.contains(name.as_str()))
            .cloned()
            .collect(),
        dangling_records,
        ..SweepReport::default()
    };
    report.orphaned_blobs.sort();

    if mode == SweepMode::Prune {
        for name in &report.orphaned_blobs {
            match blobs.delete(name).await {
                Ok(()) | Err(PhotoError::BlobMissing(_)) => {
                    report.pruned_blobs.push(name.clone())
                }
                Err(err) => warn!(filename = %name, error = %err, "failed to prune orphaned blob"),
            }
        }
        for name in &report.dangling_records {
            match metadata.remove(name).await {
                Ok(_) | Err(PhotoError::NotFound(_)) => report.pruned_records.push(name.clone()),
                Err(err) => return Err(err),
            }
        }
    }

    info!(
        mode = %mode,
        orphaned_blobs = report.orphaned_blobs.len(),
        dangling_records = report.dangling_records.len(),
        pruned_blobs = report.pruned_blobs.len(),
        pruned_records = report.pruned_records.len(),
        "photo sweep finished"
    );

    Ok(report)
}
