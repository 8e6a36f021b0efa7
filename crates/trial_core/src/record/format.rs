//! Binary envelope of a trial record.
//!
//! Layout: LZ4 block (size prepended) of the named MessagePack encoding,
//! followed by the SHA-256 of that block.

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};

use super::TrialRecord;
use crate::error::RecordError;

pub const RECORD_VERSION: u32 = 1;

const CHECKSUM_LEN: usize = 32;

pub fn encode_record(record: &TrialRecord) -> Result<Vec<u8>, RecordError> {
    let msgpack = to_vec_named(record)?;
    let compressed = compress_prepend_size(&msgpack);

    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut bytes = compressed;
    bytes.extend_from_slice(&checksum);
    Ok(bytes)
}

pub fn decode_record(bytes: &[u8]) -> Result<TrialRecord, RecordError> {
    // Size prefix plus checksum.
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(RecordError::Corrupted);
    }
    let (payload, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);

    let mut hasher = Sha256::new();
    hasher.update(payload);
    if hasher.finalize().as_slice() != checksum {
        return Err(RecordError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| RecordError::Decompression)?;
    let record: TrialRecord = from_slice(&msgpack)?;

    if record.version > RECORD_VERSION {
        return Err(RecordError::VersionMismatch {
            found: record.version,
            expected: RECORD_VERSION,
        });
    }
    Ok(record)
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{names, FrameLabels};
    use crate::math::Vec3;

    fn sample() -> TrialRecord {
        let mut record = TrialRecord::new(7);
        record.static_data.set("room", "box");
        record.static_data.set("trial_seed", 7007i64);
        record.static_data.set("push_force", Vec3::new(10.0, 0.0, 1.5));
        record
            .static_data
            .set("distractors", vec!["wood_chair".to_string()]);
        let mut labels = FrameLabels::new(0);
        labels.insert(names::TARGET_HAS_MOVED, false);
        labels.insert(names::TARGET_DELTA_POSITION, Vec3::zeros());
        record.push_frame(labels);
        record
    }

    #[test]
    fn test_envelope_preserves_record() {
        let record = sample();
        let bytes = encode_record(&record).unwrap();
        assert_eq!(decode_record(&bytes).unwrap(), record);
    }

    #[test]
    fn test_tampered_payload_fails_checksum() {
        let mut bytes = encode_record(&sample()).unwrap();
        bytes[6] ^= 0xFF;
        assert!(matches!(
            decode_record(&bytes),
            Err(RecordError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_truncated_is_corrupted() {
        assert!(matches!(
            decode_record(&[0u8; 10]),
            Err(RecordError::Corrupted)
        ));
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut record = sample();
        record.version = RECORD_VERSION + 1;
        let bytes = encode_record(&record).unwrap();
        assert!(matches!(
            decode_record(&bytes),
            Err(RecordError::VersionMismatch { found: 2, expected: 1 })
        ));
    }
}
