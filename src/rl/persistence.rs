//! Value-table persistence
//!
//! The table is written as a single JSON object mapping each state key (the
//! 16-character bit string of [`EncodedState::to_key`]) to its action values
//! in [`Action::ALL`](crate::game::Action::ALL) order:
//!
//! ```json
//! { "0010000010101000": [1.25, -0.3, 0.0] }
//! ```
//!
//! Training metadata (learner config, exploration rate, episode count) is
//! stored next to the table in `<path>.meta.json`.

use super::q_table::{ActionValues, QTable};
use super::QLearningConfig;
use crate::game::{EncodedState, KeyError, NUM_ACTIONS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Failure to save or load a value table or its metadata
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("file not found: {path:?}")]
    NotFound { path: PathBuf },
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed document {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid state key {key:?}: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: KeyError,
    },
    #[error("state {key} has {found} action values, expected {expected}")]
    InvalidValues {
        key: String,
        expected: usize,
        found: usize,
    },
    #[error("failed to serialize: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl PersistenceError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            PersistenceError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Metadata saved with a value table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Learner configuration used during training
    pub agent_config: QLearningConfig,

    /// Grid side length the table was trained on
    pub grid_size: usize,

    /// Exploration rate at save time
    pub epsilon: f64,

    /// Number of episodes trained
    pub episodes_trained: usize,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl TrainingMetadata {
    pub fn new(
        agent_config: QLearningConfig,
        grid_size: usize,
        epsilon: f64,
        episodes_trained: usize,
    ) -> Self {
        Self {
            agent_config,
            grid_size,
            epsilon,
            episodes_trained,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Path of the metadata sidecar for a table saved at `path`
pub fn metadata_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

fn write_document(path: &Path, contents: String) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PersistenceError::from_io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| PersistenceError::from_io(path, e))
}

fn read_document(path: &Path) -> Result<String, PersistenceError> {
    std::fs::read_to_string(path).map_err(|e| PersistenceError::from_io(path, e))
}

/// Save a value table as a JSON document
///
/// The document is fully rendered before the file is touched, so a
/// serialization failure never leaves a truncated file behind.
pub fn save_q_table(table: &QTable, path: &Path) -> Result<(), PersistenceError> {
    let document: BTreeMap<String, &ActionValues> = table
        .iter()
        .map(|(state, values)| (state.to_key(), values))
        .collect();

    let json = serde_json::to_string_pretty(&document).map_err(PersistenceError::Serialize)?;
    write_document(path, json)?;

    debug!(path = ?path, states = table.len(), "saved value table");
    Ok(())
}

/// Load a value table saved by [`save_q_table`]
///
/// Every key and every row is checked; the first bad entry fails the whole
/// load and no partial table is returned.
pub fn load_q_table(path: &Path) -> Result<QTable, PersistenceError> {
    let json = read_document(path)?;
    let document: BTreeMap<String, Vec<f64>> =
        serde_json::from_str(&json).map_err(|source| PersistenceError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    let mut table = QTable::new();
    for (key, values) in document {
        let state = key
            .parse::<EncodedState>()
            .map_err(|source| PersistenceError::InvalidKey {
                key: key.clone(),
                source,
            })?;

        let row: ActionValues =
            values
                .as_slice()
                .try_into()
                .map_err(|_| PersistenceError::InvalidValues {
                    key: key.clone(),
                    expected: NUM_ACTIONS,
                    found: values.len(),
                })?;

        table.insert(state, row);
    }

    debug!(path = ?path, states = table.len(), "loaded value table");
    Ok(table)
}

/// Save training metadata to the sidecar of `path`
pub fn save_metadata(metadata: &TrainingMetadata, path: &Path) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(metadata).map_err(PersistenceError::Serialize)?;
    write_document(&metadata_path(path), json)
}

/// Load training metadata from the sidecar of `path`
pub fn load_metadata(path: &Path) -> Result<TrainingMetadata, PersistenceError> {
    let meta_path = metadata_path(path);
    let json = read_document(&meta_path)?;
    serde_json::from_str(&json).map_err(|source| PersistenceError::Malformed {
        path: meta_path,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::STATE_BITS;
    use tempfile::TempDir;

    fn state(pattern: u16) -> EncodedState {
        let mut bits = [0u8; STATE_BITS];
        for (i, bit) in bits.iter_mut().enumerate() {
            *bit = ((pattern >> i) & 1) as u8;
        }
        EncodedState::from_bits(bits).unwrap()
    }

    fn sample_table() -> QTable {
        let mut table = QTable::new();
        table.insert(state(0b0001_0000_0000_0101), [1.0, -0.1, 0.0]);
        table.insert(state(0b1000_0110_0000_0000), [0.1 + 0.2, 1e-300, -9.87654321e10]);
        table.insert(state(0b0100_0001_1000_0001), [f64::MIN_POSITIVE, 2.0 / 3.0, -1.0 / 3.0]);
        table
    }

    #[test]
    fn test_table_round_trip_is_exact() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("q_table.json");
        let table = sample_table();

        save_q_table(&table, &path).unwrap();
        let loaded = load_q_table(&path).unwrap();

        assert_eq!(loaded.len(), table.len());
        for (state, values) in table.iter() {
            let restored = loaded.get(state).unwrap();
            for (a, b) in values.iter().zip(restored.iter()) {
                assert_eq!(a.to_bits(), b.to_bits());
            }
        }
    }

    #[test]
    fn test_document_uses_bit_string_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("q_table.json");
        let mut table = QTable::new();
        table.insert(state(0b0001_0000_0000_0001), [1.5, 0.0, -2.0]);

        save_q_table(&table, &path).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(
            raw,
            serde_json::json!({ "1000000000001000": [1.5, 0.0, -2.0] })
        );
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/q_table.json");

        save_q_table(&sample_table(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");

        assert!(matches!(
            load_q_table(&path),
            Err(PersistenceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_bad_json_is_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ \"0000000000001000\": [1.0, 2.0").unwrap();

        assert!(matches!(
            load_q_table(&path),
            Err(PersistenceError::Malformed { .. })
        ));
    }

    #[test]
    fn test_tuple_style_key_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("legacy.json");
        std::fs::write(
            &path,
            r#"{"(0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 1, 0, 0, 0)": [0.0, 0.0, 0.0]}"#,
        )
        .unwrap();

        assert!(matches!(
            load_q_table(&path),
            Err(PersistenceError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_wrong_row_length_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("four.json");
        std::fs::write(&path, r#"{"0000000000001000": [0.0, 1.0, 2.0, 3.0]}"#).unwrap();

        match load_q_table(&path) {
            Err(PersistenceError::InvalidValues {
                expected, found, ..
            }) => {
                assert_eq!(expected, 3);
                assert_eq!(found, 4);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_metadata_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("q_table.json");
        let metadata = TrainingMetadata::new(QLearningConfig::default(), 20, 0.25, 400);

        save_metadata(&metadata, &path).unwrap();
        assert!(temp_dir.path().join("q_table.meta.json").exists());

        let loaded = load_metadata(&path).unwrap();
        assert_eq!(loaded, metadata);
        assert_eq!(loaded.version, env!("CARGO_PKG_VERSION"));
    }
}
