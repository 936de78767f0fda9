//! Record codec
//!
//! Binary encoding shared by journal records, segment index records, and
//! segment data records.
//!
//! ## Record Layouts
//! ```text
//! Keyed record (journal, segment index):
//! ┌─────────┬─────────────┬─────────────┬───────┬─────────┐
//! │ CRC (4) │ KeyLen (4)  │ ValLen (4)  │ Key   │ Value   │
//! └─────────┴─────────────┴─────────────┴───────┴─────────┘
//!
//! Value-only record (segment data):
//! ┌─────────┬─────────────┬─────────┐
//! │ CRC (4) │ ValLen (4)  │ Value   │
//! └─────────┴─────────────┴─────────┘
//! ```
//!
//! All integers are little-endian u32. The CRC-32 is chained: header bytes
//! after the checksum field, then key bytes (if present), then value bytes.

use std::io::Read;

use crate::error::{EmberError, Result};

/// Size of the checksum field
pub const CRC_SIZE: usize = 4;

/// Header size for keyed records: CRC (4) + KeyLen (4) + ValLen (4)
pub const KV_HEADER_SIZE: usize = 12;

/// Header size for value-only records: CRC (4) + ValLen (4)
pub const VALUE_HEADER_SIZE: usize = 8;

/// A (key, value) record as stored in journal and segment index files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvRecord {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// A value-only record as stored in segment data files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRecord {
    pub value: Vec<u8>,
}

/// Encoding/decoding of one record layout.
///
/// `decode` returns `Ok(None)` on a clean end-of-file (no header bytes at
/// all); a partially-read header or body is a corruption error.
pub trait RecordCodec {
    type Record;

    fn encode(record: &Self::Record) -> Vec<u8>;

    fn decode<R: Read>(reader: &mut R) -> Result<Option<Self::Record>>;
}

/// Codec for keyed records
pub struct KvCodec;

/// Codec for value-only records
pub struct ValueCodec;

impl RecordCodec for KvCodec {
    type Record = KvRecord;

    fn encode(record: &KvRecord) -> Vec<u8> {
        let key_len = (record.key.len() as u32).to_le_bytes();
        let val_len = (record.value.len() as u32).to_le_bytes();

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&key_len);
        hasher.update(&val_len);
        hasher.update(&record.key);
        hasher.update(&record.value);
        let crc = hasher.finalize();

        let mut buf = Vec::with_capacity(KV_HEADER_SIZE + record.key.len() + record.value.len());
        buf.extend_from_slice(&crc.to_le_bytes());
        buf.extend_from_slice(&key_len);
        buf.extend_from_slice(&val_len);
        buf.extend_from_slice(&record.key);
        buf.extend_from_slice(&record.value);
        buf
    }

    fn decode<R: Read>(reader: &mut R) -> Result<Option<KvRecord>> {
        let mut header = [0u8; KV_HEADER_SIZE];
        if !read_header(reader, &mut header)? {
            return Ok(None);
        }

        let stored_crc = u32::from_le_bytes(header[0..4].try_into().unwrap());
        let key_len = u32::from_le_bytes(header[4..8].try_into().unwrap()) as usize;
        let val_len = u32::from_le_bytes(header[8..12].try_into().unwrap()) as usize;

        let key = read_body(reader, key_len)?;
        let value = read_body(reader, val_len)?;

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&header[CRC_SIZE..]);
        hasher.update(&key);
        hasher.update(&value);
        if hasher.finalize() != stored_crc {
            return Err(EmberError::Corruption("mismatching CRC".to_string()));
        }

        Ok(Some(KvRecord { key, value }))
    }
}

impl RecordCodec for ValueCodec {
    type Record = ValueRecord;

    fn encode(record: &ValueRecord) -> Vec<u8> {
        let val_len = (record.value.len() as u32).to_le_bytes();

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&val_len);
        hasher.update(&record.value);
        let crc = hasher.finalize();

        let mut buf = Vec::with_capacity(VALUE_HEADER_SIZE + record.value.len());
        buf.extend_from_slice(&crc.to_le_bytes());
        buf.extend_from_slice(&val_len);
        buf.extend_from_slice(&record.value);
        buf
    }

    fn decode<R: Read>(reader: &mut R) -> Result<Option<ValueRecord>> {
        let mut header = [0u8; VALUE_HEADER_SIZE];
        if !read_header(reader, &mut header)? {
            return Ok(None);
        }

        let stored_crc = u32::from_le_bytes(header[0..4].try_into().unwrap());
        let val_len = u32::from_le_bytes(header[4..8].try_into().unwrap()) as usize;

        let value = read_body(reader, val_len)?;

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&header[CRC_SIZE..]);
        hasher.update(&value);
        if hasher.finalize() != stored_crc {
            return Err(EmberError::Corruption("mismatching CRC".to_string()));
        }

        Ok(Some(ValueRecord { value }))
    }
}

/// Fill `buf` with header bytes. Returns `Ok(false)` on a clean EOF before
/// the first byte; a partial header is a corruption error.
fn read_header(reader: &mut impl Read, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(false);
            }
            return Err(EmberError::Corruption(
                "truncated record header".to_string(),
            ));
        }
        filled += n;
    }
    Ok(true)
}

/// Read exactly `len` body bytes; an early EOF is a corruption error.
fn read_body(reader: &mut impl Read, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            EmberError::Corruption("truncated record body".to_string())
        } else {
            EmberError::Io(e)
        }
    })?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_round_trip() {
        let record = KvRecord {
            key: b"hello".to_vec(),
            value: b"world".to_vec(),
        };
        let encoded = KvCodec::encode(&record);
        let decoded = KvCodec::decode(&mut encoded.as_slice()).unwrap().unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn value_round_trip() {
        let record = ValueRecord {
            value: b"payload".to_vec(),
        };
        let encoded = ValueCodec::encode(&record);
        let decoded = ValueCodec::decode(&mut encoded.as_slice()).unwrap().unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn clean_eof_is_none() {
        let empty: &[u8] = &[];
        assert!(KvCodec::decode(&mut &empty[..]).unwrap().is_none());
        assert!(ValueCodec::decode(&mut &empty[..]).unwrap().is_none());
    }

    #[test]
    fn flipped_byte_fails_crc() {
        let record = KvRecord {
            key: b"key".to_vec(),
            value: b"value".to_vec(),
        };
        let mut encoded = KvCodec::encode(&record);
        // flip one byte inside the value region
        let last = encoded.len() - 1;
        encoded[last] ^= 0xFF;
        let err = KvCodec::decode(&mut encoded.as_slice()).unwrap_err();
        assert!(matches!(err, EmberError::Corruption(_)));
    }

    #[test]
    fn truncated_header_is_corruption() {
        let record = ValueRecord {
            value: b"abc".to_vec(),
        };
        let encoded = ValueCodec::encode(&record);
        let err = ValueCodec::decode(&mut &encoded[..VALUE_HEADER_SIZE - 2])
            .unwrap_err();
        assert!(matches!(err, EmberError::Corruption(_)));
    }

    #[test]
    fn truncated_body_is_corruption() {
        let record = KvRecord {
            key: b"key".to_vec(),
            value: b"value".to_vec(),
        };
        let encoded = KvCodec::encode(&record);
        let err = KvCodec::decode(&mut &encoded[..encoded.len() - 2]).unwrap_err();
        assert!(matches!(err, EmberError::Corruption(_)));
    }
}
