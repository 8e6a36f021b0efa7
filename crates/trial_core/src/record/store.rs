use std::collections::BTreeMap;
use std::fs::{rename, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::format::{decode_record, encode_record};
use super::TrialRecord;
use crate::config::ScenarioConfig;
use crate::error::RecordError;

pub const METADATA_FILE: &str = "metadata.json";

/// Run-level metadata written next to the trial records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub catalog_size: usize,
    pub config: ScenarioConfig,
}

impl RunMetadata {
    pub fn new(config: &ScenarioConfig, catalog_size: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            catalog_size,
            config: config.clone(),
        }
    }
}

/// Hierarchical store: one record per trial, keyed by trial number.
pub trait RecordStore {
    fn write_trial(&mut self, record: &TrialRecord) -> Result<(), RecordError>;

    fn read_trial(&self, trial_num: u32) -> Result<TrialRecord, RecordError>;

    /// Stored trial numbers, ascending.
    fn trial_numbers(&self) -> Result<Vec<u32>, RecordError>;

    fn write_metadata(&mut self, metadata: &RunMetadata) -> Result<(), RecordError>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn write_trial(&mut self, record: &TrialRecord) -> Result<(), RecordError> {
        (**self).write_trial(record)
    }

    fn read_trial(&self, trial_num: u32) -> Result<TrialRecord, RecordError> {
        (**self).read_trial(trial_num)
    }

    fn trial_numbers(&self) -> Result<Vec<u32>, RecordError> {
        (**self).trial_numbers()
    }

    fn write_metadata(&mut self, metadata: &RunMetadata) -> Result<(), RecordError> {
        (**self).write_metadata(metadata)
    }
}

/// `trial_NNNN.rec` files in one directory, with an optional pretty JSON
/// copy of each record.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    json_mirror: bool,
}

impl DirectoryStore {
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            json_mirror: false,
        })
    }

    /// Open an existing store for reading.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(RecordError::NotFound {
                path: root.display().to_string(),
            });
        }
        Ok(Self {
            root,
            json_mirror: false,
        })
    }

    pub fn with_json_mirror(mut self, enabled: bool) -> Self {
        self.json_mirror = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn trial_path(&self, trial_num: u32) -> PathBuf {
        self.root.join(format!("trial_{:04}.rec", trial_num))
    }

    pub fn read_metadata(&self) -> Result<RunMetadata, RecordError> {
        let path = self.root.join(METADATA_FILE);
        let data = read_file(&path)?;
        Ok(serde_json::from_slice(&data)?)
    }
}

/// Write to `<path>.tmp`, sync, then rename over `path`.
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), RecordError> {
    let temp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.flush()?;
        file.sync_all()?;
    }
    rename(&temp_path, path)?;
    debug!(bytes = data.len(), path = %path.display(), "record written");
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>, RecordError> {
    if !path.exists() {
        return Err(RecordError::NotFound {
            path: path.display().to_string(),
        });
    }
    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(data)
}

fn parse_trial_number(name: &str) -> Option<u32> {
    name.strip_prefix("trial_")?
        .strip_suffix(".rec")?
        .parse()
        .ok()
}

impl RecordStore for DirectoryStore {
    fn write_trial(&mut self, record: &TrialRecord) -> Result<(), RecordError> {
        let path = self.trial_path(record.trial_num);
        write_atomic(&path, &encode_record(record)?)?;
        if self.json_mirror {
            let json = serde_json::to_vec_pretty(record)?;
            write_atomic(&path.with_extension("json"), &json)?;
        }
        Ok(())
    }

    fn read_trial(&self, trial_num: u32) -> Result<TrialRecord, RecordError> {
        let data = read_file(&self.trial_path(trial_num))?;
        decode_record(&data)
    }

    fn trial_numbers(&self) -> Result<Vec<u32>, RecordError> {
        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if let Some(n) = entry.file_name().to_str().and_then(parse_trial_number) {
                found.push(n);
            }
        }
        found.sort_unstable();
        Ok(found)
    }

    fn write_metadata(&mut self, metadata: &RunMetadata) -> Result<(), RecordError> {
        let json = serde_json::to_vec_pretty(metadata)?;
        write_atomic(&self.root.join(METADATA_FILE), &json)
    }
}

/// Keeps every record in memory. Used by `plan` and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<u32, TrialRecord>,
    metadata: Option<RunMetadata>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> impl Iterator<Item = &TrialRecord> {
        self.records.values()
    }

    pub fn metadata(&self) -> Option<&RunMetadata> {
        self.metadata.as_ref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn write_trial(&mut self, record: &TrialRecord) -> Result<(), RecordError> {
        self.records.insert(record.trial_num, record.clone());
        Ok(())
    }

    fn read_trial(&self, trial_num: u32) -> Result<TrialRecord, RecordError> {
        self.records
            .get(&trial_num)
            .cloned()
            .ok_or_else(|| RecordError::NotFound {
                path: format!("trial {trial_num}"),
            })
    }

    fn trial_numbers(&self) -> Result<Vec<u32>, RecordError> {
        Ok(self.records.keys().copied().collect())
    }

    fn write_metadata(&mut self, metadata: &RunMetadata) -> Result<(), RecordError> {
        self.metadata = Some(metadata.clone());
        Ok(())
    }
}

// ========== Tests ==========
