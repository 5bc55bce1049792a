// Snapshot encoding for feature stores
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Read, Write};

use featstore_classifier::{FeatureRow, FeatureStore};
use featstore_core::{Error, Result};

/// Leading bytes of every snapshot blob
pub const MAGIC: &[u8; 6] = b"FSTSNP";

/// Blob layout version written by this crate
pub const FORMAT_VERSION: u16 = 1;

const CHECKSUM_LEN: usize = 32;
const HEADER_LEN: usize = MAGIC.len() + 2 + CHECKSUM_LEN;

/// Full state of a feature store - config and every stored row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
    pub index_columns: [String; 2],
    pub rows: Vec<FeatureRow>,
    pub created_at: DateTime<Utc>,
}

impl StoreSnapshot {
    pub fn from_store(store: &FeatureStore) -> Self {
        Self {
            feature_names: store.get_feature_names().to_vec(),
            class_names: store.get_class_names().to_vec(),
            index_columns: store.index_columns().map(str::to_string),
            rows: store.rows().cloned().collect(),
            created_at: Utc::now(),
        }
    }

    /// Rebuild the store, re-checking every row
    pub fn into_store(self) -> Result<FeatureStore> {
        let [roi, label] = &self.index_columns;
        FeatureStore::restore(
            &self.feature_names,
            &self.class_names,
            [roi.as_str(), label.as_str()],
            self.rows,
        )
    }
}

/// Serialize the whole store into an opaque blob.
///
/// Fails without producing output when the stored table does not conform to
/// the internal schema.
pub fn save(store: &FeatureStore) -> Result<Vec<u8>> {
    store
        .check_conformance()
        .map_err(|e| Error::Serialization(format!("store is not schema-conformant: {}", e)))?;
    encode(&StoreSnapshot::from_store(store))
}

/// Reconstruct a store from a blob written by [`save`]
pub fn load(bytes: &[u8]) -> Result<FeatureStore> {
    decode(bytes)?
        .into_store()
        .map_err(|e| Error::Serialization(format!("snapshot holds an invalid table: {}", e)))
}

/// Encode a snapshot: magic, version, sha256 of the payload, gzip(bincode)
pub fn encode(snapshot: &StoreSnapshot) -> Result<Vec<u8>> {
    let raw = bincode::serialize(snapshot)
        .map_err(|e| Error::Serialization(format!("encoding snapshot: {}", e)))?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    let payload = encoder.finish()?;

    let mut blob = Vec::with_capacity(HEADER_LEN + payload.len());
    blob.extend_from_slice(MAGIC);
    blob.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    blob.extend_from_slice(&Sha256::digest(&payload));
    blob.extend_from_slice(&payload);
    Ok(blob)
}

/// Decode and verify a snapshot blob without rebuilding the store
pub fn decode(bytes: &[u8]) -> Result<StoreSnapshot> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(Error::Serialization("not a feature store snapshot".to_string()));
    }

    let version = u16::from_le_bytes([bytes[MAGIC.len()], bytes[MAGIC.len() + 1]]);
    if version != FORMAT_VERSION {
        return Err(Error::Serialization(format!(
            "unsupported snapshot version {} (expected {})",
            version, FORMAT_VERSION
        )));
    }

    let checksum = &bytes[MAGIC.len() + 2..HEADER_LEN];
    let payload = &bytes[HEADER_LEN..];
    if Sha256::digest(payload).as_slice() != checksum {
        return Err(Error::Serialization("snapshot checksum mismatch".to_string()));
    }

    let mut raw = Vec::new();
    GzDecoder::new(payload)
        .read_to_end(&mut raw)
        .map_err(|e| Error::Serialization(format!("decompressing snapshot: {}", e)))?;
    bincode::deserialize(&raw)
        .map_err(|e| Error::Serialization(format!("decoding snapshot: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use featstore_core::{CompositeKey, Frame};

    fn populated() -> FeatureStore {
        let mut store = FeatureStore::new(&["f1", "f2"], &["healthy", "sick"]).unwrap();
        let frame = Frame::new()
            .with_column("roi_id", ["A", "A", "B"])
            .unwrap()
            .with_column("label", [1u64, 2, 7])
            .unwrap()
            .with_column("annotations", [1i64, 2, 1])
            .unwrap()
            .with_column("f1", [0.2, 0.1, 0.7])
            .unwrap()
            .with_column("f2", [0.5, 0.9, 0.3])
            .unwrap();
        store.add_features(&frame).unwrap();
        store
    }

    #[test]
    fn test_round_trip_preserves_rows_and_names() {
        let store = populated();
        let loaded = load(&save(&store).unwrap()).unwrap();

        assert_eq!(loaded.get_feature_names(), store.get_feature_names());
        assert_eq!(loaded.get_class_names(), store.get_class_names());
        let before: Vec<_> = store.rows().cloned().collect();
        let after: Vec<_> = loaded.rows().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(
            loaded.get(&CompositeKey::new("B", 7)).unwrap().hash,
            CompositeKey::new("B", 7).normalized_hash()
        );
    }

    #[test]
    fn test_empty_store_round_trip() {
        let store = FeatureStore::new(&["f1"], &["a"]).unwrap();
        let loaded = load(&save(&store).unwrap()).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_corrupted_payload_is_rejected() {
        let mut blob = save(&populated()).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0xFF;
        assert!(matches!(load(&blob), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_truncated_blob_is_rejected() {
        let blob = save(&populated()).unwrap();
        assert!(matches!(load(&blob[..10]), Err(Error::Serialization(_))));
        assert!(matches!(load(b"garbage"), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let mut blob = save(&populated()).unwrap();
        blob[MAGIC.len()] = 9;
        assert!(matches!(load(&blob), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_snapshot_with_bad_row_is_rejected() {
        let mut snapshot = StoreSnapshot::from_store(&populated());
        snapshot.rows[0].annotation = 5;
        let blob = encode(&snapshot).unwrap();
        assert!(matches!(load(&blob), Err(Error::Serialization(_))));
    }
}
