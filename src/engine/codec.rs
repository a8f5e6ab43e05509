//! kvlog - Record Codec
//! Encodes and decodes single log records and verifies their checksums.
//!
//! ## Binary Format (per record, little-endian)
//! ```text
//! [crc: 4 bytes][key_len: 4 bytes][val_len: 4 bytes][key: N bytes][value: M bytes]
//! ```
//! The CRC-32 (IEEE) covers `key || value`. A zero `val_len` is a tombstone.

use std::io::{ErrorKind, Read};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, StoreError};
use crate::types::Record;

/// Size of the fixed record header (checksum + key length + value length).
pub const HEADER_SIZE: usize = 12;

/// Total encoded size of a record with the given key and value lengths.
pub fn encoded_len(key_len: usize, value_len: usize) -> usize {
    HEADER_SIZE + key_len + value_len
}

/// CRC-32/IEEE over the key bytes followed by the value bytes.
pub fn checksum(key: &[u8], value: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(key);
    hasher.update(value);
    hasher.finalize()
}

/// Encode one record into a contiguous buffer ready for a single write.
pub fn encode(key: &[u8], value: &[u8]) -> Result<Bytes> {
    let key_len = u32::try_from(key.len()).map_err(|_| StoreError::RecordTooLarge(key.len()))?;
    let value_len =
        u32::try_from(value.len()).map_err(|_| StoreError::RecordTooLarge(value.len()))?;

    let mut buf = BytesMut::with_capacity(encoded_len(key.len(), value.len()));
    buf.put_u32_le(checksum(key, value));
    buf.put_u32_le(key_len);
    buf.put_u32_le(value_len);
    buf.put_slice(key);
    buf.put_slice(value);
    Ok(buf.freeze())
}

/// Decode the next record from `reader`.
///
/// Returns `Ok(None)` when the reader is exhausted before any header byte
/// (clean end of log). A partial header or short body yields
/// `StoreError::Truncated`; a checksum mismatch yields
/// `StoreError::CorruptRecord`.
pub fn decode<R: Read>(reader: &mut R) -> Result<Option<Record>> {
    let mut header = [0u8; HEADER_SIZE];
    let filled = read_full(reader, &mut header)?;
    if filled == 0 {
        return Ok(None);
    }
    if filled < HEADER_SIZE {
        return Err(StoreError::Truncated {
            expected: HEADER_SIZE as u64,
            found: filled as u64,
        });
    }

    let mut cursor = &header[..];
    let stored = cursor.get_u32_le();
    let key_len = cursor.get_u32_le() as usize;
    let value_len = cursor.get_u32_le() as usize;

    // Grow the buffer as bytes arrive; a corrupt header must not drive a
    // multi-gigabyte allocation.
    let body_len = key_len as u64 + value_len as u64;
    let mut body = Vec::new();
    reader.by_ref().take(body_len).read_to_end(&mut body)?;
    if (body.len() as u64) < body_len {
        return Err(StoreError::Truncated {
            expected: body_len,
            found: body.len() as u64,
        });
    }

    let value = body.split_off(key_len);
    let key = body;
    let computed = checksum(&key, &value);
    if computed != stored {
        return Err(StoreError::CorruptRecord { stored, computed });
    }

    Ok(Some(Record { key, value }))
}

/// Fill `buf` as far as the reader allows, returning the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    #[test]
    fn test_header_layout() {
        let encoded = encode(b"ab", b"xyz").unwrap();
        assert_eq!(encoded.len(), HEADER_SIZE + 5);
        assert_eq!(&encoded[0..4], &crc32fast::hash(b"abxyz").to_le_bytes());
        assert_eq!(&encoded[4..8], &2u32.to_le_bytes());
        assert_eq!(&encoded[8..12], &3u32.to_le_bytes());
        assert_eq!(&encoded[12..], b"abxyz");
    }

    #[test]
    fn test_decode_tombstone() {
        let encoded = encode(b"gone", b"").unwrap();
        let record = decode(&mut Cursor::new(encoded)).unwrap().unwrap();
        assert_eq!(record.key, b"gone");
        assert!(record.is_tombstone());
    }

    #[test]
    fn test_decode_empty_stream_is_end_of_log() {
        let mut empty = Cursor::new(Vec::<u8>::new());
        assert!(decode(&mut empty).unwrap().is_none());
    }

    #[test]
    fn test_decode_consecutive_records() {
        let mut log = encode(b"k1", b"v1").unwrap().to_vec();
        log.extend_from_slice(&encode(b"k2", b"").unwrap());
        let mut cursor = Cursor::new(log);

        assert_eq!(decode(&mut cursor).unwrap(), Some(Record::put(b"k1".to_vec(), b"v1".to_vec())));
        assert_eq!(decode(&mut cursor).unwrap(), Some(Record::tombstone(b"k2".to_vec())));
        assert_eq!(decode(&mut cursor).unwrap(), None);
    }

    #[test]
    fn test_partial_header_is_truncated() {
        let encoded = encode(b"key", b"value").unwrap();
        let err = decode(&mut Cursor::new(&encoded[..7])).unwrap_err();
        assert!(matches!(err, StoreError::Truncated { expected: 12, found: 7 }));
    }

    #[test]
    fn test_short_body_is_truncated() {
        let encoded = encode(b"key", b"value").unwrap();
        let err = decode(&mut Cursor::new(&encoded[..encoded.len() - 2])).unwrap_err();
        assert!(matches!(err, StoreError::Truncated { expected: 8, found: 6 }));
    }

    #[test]
    fn test_huge_length_field_does_not_allocate() {
        let mut bogus = vec![0u8; HEADER_SIZE];
        bogus[4..8].copy_from_slice(&u32::MAX.to_le_bytes());
        bogus[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        bogus.extend_from_slice(b"tiny");
        let err = decode(&mut Cursor::new(bogus)).unwrap_err();
        assert!(matches!(err, StoreError::Truncated { found: 4, .. }));
    }

    #[test]
    fn test_flipped_value_byte_is_corrupt() {
        let mut encoded = encode(b"key", b"value").unwrap().to_vec();
        let last = encoded.len() - 1;
        encoded[last] ^= 0xFF;
        let err = decode(&mut Cursor::new(encoded)).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_flipped_checksum_is_corrupt() {
        let mut encoded = encode(b"key", b"value").unwrap().to_vec();
        encoded[0] ^= 0x01;
        assert!(decode(&mut Cursor::new(encoded)).unwrap_err().is_corruption());
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            key in proptest::collection::vec(any::<u8>(), 0..64),
            value in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let encoded = encode(&key, &value).unwrap();
            prop_assert_eq!(encoded.len(), encoded_len(key.len(), value.len()));
            let record = decode(&mut Cursor::new(encoded)).unwrap().unwrap();
            prop_assert_eq!(record.key, key);
            prop_assert_eq!(record.value, value);
        }
    }
}
