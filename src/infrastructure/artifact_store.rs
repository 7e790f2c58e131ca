use crate::domain::error::{AppError, Result};
use crate::domain::qa_example::DatasetSelection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

fn io_err(msg: impl Into<String>) -> AppError {
    AppError::IoError(msg.into())
}

/// Where request, result and evaluation files live under the data directory.
///
/// Batch payloads are kept after a run so a failed or suspicious job can be
/// audited or resubmitted without rebuilding the requests.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.to_path_buf(),
        }
    }

    pub fn ensure(&self) -> Result<()> {
        ensure_dir(&self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn batch_input_path(&self) -> PathBuf {
        self.root.join("batch_input.jsonl")
    }

    pub fn batch_results_path(&self) -> PathBuf {
        self.root.join("batch_results.jsonl")
    }

    pub fn fine_tuning_dataset_path(&self, selection: DatasetSelection) -> PathBuf {
        self.root
            .join(format!("cuad_{}_fine_tuning_dataset.jsonl", selection.as_str()))
    }

    pub fn predictions_path(&self, selection: DatasetSelection) -> PathBuf {
        self.root
            .join(format!("cuad_{}_predictions.jsonl", selection.as_str()))
    }
}

/// Sidecar record written next to an uploaded or downloaded payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub file_name: String,
    pub size_bytes: u64,
    pub sha256: String,
    pub remote_id: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

pub fn manifest_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".manifest.json");
    path.with_file_name(name)
}

/// Writes `bytes` to `path` and a manifest beside it.
pub fn store_artifact(path: &Path, bytes: &[u8], remote_id: Option<&str>) -> Result<ArtifactManifest> {
    atomic_write_bytes(path, bytes)?;
    let manifest = ArtifactManifest {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        size_bytes: bytes.len() as u64,
        sha256: sha256_hex(bytes),
        remote_id: remote_id.map(|id| id.to_string()),
        recorded_at: Utc::now(),
    };
    write_manifest(path, &manifest)?;
    Ok(manifest)
}

/// Rewrites the manifest once the remote id is known (e.g. after upload).
pub fn write_manifest(path: &Path, manifest: &ArtifactManifest) -> Result<()> {
    let encoded = serde_json::to_vec_pretty(manifest)?;
    atomic_write_bytes(&manifest_path(path), &encoded)
}

pub fn read_manifest(path: &Path) -> Result<ArtifactManifest> {
    let manifest_file = manifest_path(path);
    let bytes = fs::read(&manifest_file)
        .map_err(|e| io_err(format!("Failed to read manifest {}: {e}", manifest_file.display())))?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| io_err(format!("Failed to create dir {}: {e}", path.display())))?;
    Ok(())
}

pub fn atomic_write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }

    let tmp_path = path.with_extension(format!("tmp-{}", Uuid::new_v4()));
    {
        let mut file = fs::File::create(&tmp_path).map_err(|e| {
            io_err(format!(
                "Failed to create temp file {}: {e}",
                tmp_path.display()
            ))
        })?;
        file.write_all(bytes).map_err(|e| {
            io_err(format!(
                "Failed to write temp file {}: {e}",
                tmp_path.display()
            ))
        })?;
        file.sync_all().ok();
    }

    // Rename only replaces atomically on unix; on Windows move the old file aside first.
    if cfg!(windows) && path.exists() {
        let backup = path.with_extension(format!("bak-{}", Uuid::new_v4()));
        fs::rename(path, &backup).map_err(|e| {
            io_err(format!(
                "Failed to move existing file {} to {}: {e}",
                path.display(),
                backup.display()
            ))
        })?;
        fs::rename(&tmp_path, path).map_err(|e| {
            io_err(format!(
                "Failed to rename temp file {} to {}: {e}",
                tmp_path.display(),
                path.display()
            ))
        })?;
        let _ = fs::remove_file(&backup);
        return Ok(());
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        io_err(format!(
            "Failed to rename temp file {} to {}: {e}",
            tmp_path.display(),
            path.display()
        ))
    })
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = ArtifactLayout::new(Path::new("data"));
        assert_eq!(layout.batch_input_path(), Path::new("data/batch_input.jsonl"));
        assert_eq!(
            layout.fine_tuning_dataset_path(DatasetSelection::Train),
            Path::new("data/cuad_train_fine_tuning_dataset.jsonl")
        );
        assert_eq!(
            layout.predictions_path(DatasetSelection::Test),
            Path::new("data/cuad_test_predictions.jsonl")
        );
        assert_eq!(
            manifest_path(&layout.batch_results_path()),
            Path::new("data/batch_results.jsonl.manifest.json")
        );
    }

    #[test]
    fn test_store_artifact_writes_payload_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("batch_input.jsonl");

        let manifest = store_artifact(&path, b"abc", Some("file-1")).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"abc");
        assert_eq!(manifest.size_bytes, 3);
        assert_eq!(
            manifest.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(read_manifest(&path).unwrap(), manifest);
    }

    #[test]
    fn test_atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch_results.jsonl");

        atomic_write_bytes(&path, b"old").unwrap();
        atomic_write_bytes(&path, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");

        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
