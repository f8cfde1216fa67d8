//! Dataset loading.

use std::path::{Path, PathBuf};

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::domain::{DatewiseError, EvaluationRecord, Result};

/// A loaded dataset: records in file order plus the file's digest.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub path: PathBuf,
    pub records: Vec<EvaluationRecord>,
    /// Hex SHA-256 of the raw file bytes.
    pub digest: String,
}

impl Dataset {
    /// Load a JSON array of objects.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| DatewiseError::InvalidDataset {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let records = parse_records(&bytes).map_err(|reason| DatewiseError::InvalidDataset {
            path: path.to_path_buf(),
            reason,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            records,
            digest: hex::encode(Sha256::digest(&bytes)),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_records(bytes: &[u8]) -> std::result::Result<Vec<EvaluationRecord>, String> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
    let Value::Array(items) = value else {
        return Err("expected a JSON array of records".to_string());
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(fields) => Ok(EvaluationRecord::new(fields)),
            other => Err(format!("record {i} is not an object: {other}")),
        })
        .collect()
}
