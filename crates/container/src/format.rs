//! Container wire format.
//!
//! # File Layout
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ Header (8 bytes)                   │
//! ├────────────────────────────────────┤
//! │ Record 1                           │
//! ├────────────────────────────────────┤
//! │ Record 2                           │
//! ├────────────────────────────────────┤
//! │ ...                                │
//! └────────────────────────────────────┘
//! ```
//!
//! Header: magic "BAGC" (4 bytes) + format version (u32 LE).
//!
//! # Record Layout
//!
//! ```text
//! ┌──────────────────┬────────────┬─────────────────────┬───────────┐
//! │ Length (4 bytes) │ Opcode (1) │ Payload (variable)  │ CRC32 (4) │
//! └──────────────────┴────────────┴─────────────────────┴───────────┘
//! ```
//!
//! The length field covers opcode + payload + CRC. The CRC is computed over
//! opcode + payload. Strings are u32-length-prefixed UTF-8; metadata is a
//! u32 pair count followed by key/value strings. All integers little-endian.

use byteorder::{LittleEndian, ReadBytesExt};
use std::collections::BTreeMap;
use std::io::Read;

use bagmerge_core::{ChannelDef, Message, SchemaDef};

use crate::error::{FormatError, Result};

/// Magic bytes identifying a container file: "BAGC"
pub const CONTAINER_MAGIC: [u8; 4] = *b"BAGC";

/// Current container format version
pub const FORMAT_VERSION: u32 = 1;

/// Size of the file header in bytes
pub const HEADER_SIZE: usize = 8;

/// Largest record this codec will read (guards allocations on corrupt input)
pub const MAX_RECORD_LEN: usize = 64 * 1024 * 1024;

/// Record opcode: schema definition
pub const OP_SCHEMA: u8 = 0x01;
/// Record opcode: channel definition
pub const OP_CHANNEL: u8 = 0x02;
/// Record opcode: message
pub const OP_MESSAGE: u8 = 0x03;

/// One decoded container record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A schema definition
    Schema(SchemaDef),
    /// A channel definition
    Channel(ChannelDef),
    /// A timestamped message
    Message(Message),
}

/// Encode the file header.
pub fn encode_header() -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&CONTAINER_MAGIC);
    header[4..8].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
    header
}

/// Validate a file header, returning the declared format version.
pub fn decode_header(bytes: &[u8; HEADER_SIZE]) -> Result<u32> {
    if bytes[0..4] != CONTAINER_MAGIC {
        return Err(FormatError::InvalidMagic);
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }
    Ok(version)
}

impl Record {
    /// Serialize this record with length prefix and CRC.
    pub fn to_bytes(&self) -> Vec<u8> {
        let (opcode, payload) = match self {
            Record::Schema(schema) => (OP_SCHEMA, encode_schema(schema)),
            Record::Channel(channel) => (OP_CHANNEL, encode_channel(channel)),
            Record::Message(message) => (OP_MESSAGE, encode_message(message)),
        };

        let mut body = Vec::with_capacity(1 + payload.len());
        body.push(opcode);
        body.extend_from_slice(&payload);

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&body);
        let crc = hasher.finalize();

        let total_len = body.len() + 4;
        let mut record = Vec::with_capacity(4 + total_len);
        record.extend_from_slice(&(total_len as u32).to_le_bytes());
        record.extend_from_slice(&body);
        record.extend_from_slice(&crc.to_le_bytes());
        record
    }

    /// Decode a record body (everything after the length prefix).
    ///
    /// `offset` is the file offset of the record, used only for error
    /// reporting.
    pub fn from_body(body: &[u8], offset: u64) -> Result<Record> {
        // Minimum: 1 byte opcode + 4 bytes CRC
        if body.len() < 5 {
            return Err(FormatError::Truncated { offset });
        }

        let (checked, crc_bytes) = body.split_at(body.len() - 4);
        let stored_crc = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(checked);
        if hasher.finalize() != stored_crc {
            return Err(FormatError::ChecksumMismatch { offset });
        }

        let opcode = checked[0];
        let payload = &checked[1..];
        match opcode {
            OP_SCHEMA => Ok(Record::Schema(decode_schema(payload)?)),
            OP_CHANNEL => Ok(Record::Channel(decode_channel(payload)?)),
            OP_MESSAGE => Ok(Record::Message(decode_message(payload)?)),
            other => Err(FormatError::Malformed(format!("unknown opcode {:#04x}", other))),
        }
    }
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn write_bytes(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
}

fn read_string(input: &mut &[u8]) -> Result<String> {
    let bytes = read_blob(input)?;
    String::from_utf8(bytes).map_err(|_| FormatError::Malformed("invalid UTF-8 string".to_string()))
}

fn read_blob(input: &mut &[u8]) -> Result<Vec<u8>> {
    let len = input
        .read_u32::<LittleEndian>()
        .map_err(|_| FormatError::Malformed("short field length".to_string()))? as usize;
    if input.len() < len {
        return Err(FormatError::Malformed("field overruns record".to_string()));
    }
    let mut bytes = vec![0u8; len];
    input
        .read_exact(&mut bytes)
        .map_err(|_| FormatError::Malformed("short field".to_string()))?;
    Ok(bytes)
}

fn encode_schema(schema: &SchemaDef) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&schema.id.to_le_bytes());
    write_string(&mut out, &schema.name);
    write_string(&mut out, &schema.encoding);
    write_bytes(&mut out, &schema.data);
    out
}

fn decode_schema(mut payload: &[u8]) -> Result<SchemaDef> {
    let id = payload
        .read_u16::<LittleEndian>()
        .map_err(|_| FormatError::Malformed("short schema record".to_string()))?;
    let name = read_string(&mut payload)?;
    let encoding = read_string(&mut payload)?;
    let data = read_blob(&mut payload)?;
    Ok(SchemaDef {
        id,
        name,
        encoding,
        data,
    })
}

fn encode_channel(channel: &ChannelDef) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&channel.id.to_le_bytes());
    out.extend_from_slice(&channel.schema_id.to_le_bytes());
    write_string(&mut out, &channel.topic);
    write_string(&mut out, &channel.message_encoding);
    out.extend_from_slice(&(channel.metadata.len() as u32).to_le_bytes());
    for (key, value) in &channel.metadata {
        write_string(&mut out, key);
        write_string(&mut out, value);
    }
    out
}

fn decode_channel(mut payload: &[u8]) -> Result<ChannelDef> {
    let id = payload
        .read_u16::<LittleEndian>()
        .map_err(|_| FormatError::Malformed("short channel record".to_string()))?;
    let schema_id = payload
        .read_u16::<LittleEndian>()
        .map_err(|_| FormatError::Malformed("short channel record".to_string()))?;
    let topic = read_string(&mut payload)?;
    let message_encoding = read_string(&mut payload)?;
    let pair_count = payload
        .read_u32::<LittleEndian>()
        .map_err(|_| FormatError::Malformed("short channel record".to_string()))?;
    let mut metadata = BTreeMap::new();
    for _ in 0..pair_count {
        let key = read_string(&mut payload)?;
        let value = read_string(&mut payload)?;
        metadata.insert(key, value);
    }
    Ok(ChannelDef {
        id,
        schema_id,
        topic,
        message_encoding,
        metadata,
    })
}

fn encode_message(message: &Message) -> Vec<u8> {
    let mut out = Vec::with_capacity(18 + message.data.len());
    out.extend_from_slice(&message.channel_id.to_le_bytes());
    out.extend_from_slice(&message.log_time.to_le_bytes());
    out.extend_from_slice(&message.publish_time.to_le_bytes());
    out.extend_from_slice(&message.data);
    out
}

fn decode_message(mut payload: &[u8]) -> Result<Message> {
    let channel_id = payload
        .read_u16::<LittleEndian>()
        .map_err(|_| FormatError::Malformed("short message record".to_string()))?;
    let log_time = payload
        .read_u64::<LittleEndian>()
        .map_err(|_| FormatError::Malformed("short message record".to_string()))?;
    let publish_time = payload
        .read_u64::<LittleEndian>()
        .map_err(|_| FormatError::Malformed("short message record".to_string()))?;
    Ok(Message {
        channel_id,
        log_time,
        publish_time,
        data: payload.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> SchemaDef {
        SchemaDef {
            id: 1,
            name: "geometry/Pose".to_string(),
            encoding: "jsonschema".to_string(),
            data: b"{\"type\":\"object\"}".to_vec(),
        }
    }

    fn sample_channel() -> ChannelDef {
        let mut metadata = BTreeMap::new();
        metadata.insert("qos".to_string(), "latched".to_string());
        ChannelDef {
            id: 2,
            schema_id: 1,
            topic: "/pose".to_string(),
            message_encoding: "json".to_string(),
            metadata,
        }
    }

    #[test]
    fn test_header_round_trip() {
        let header = encode_header();
        assert_eq!(decode_header(&header).unwrap(), FORMAT_VERSION);
    }

    #[test]
    fn test_header_rejects_bad_magic() {
        let mut header = encode_header();
        header[0] = b'X';
        assert!(matches!(
            decode_header(&header),
            Err(FormatError::InvalidMagic)
        ));
    }

    #[test]
    fn test_header_rejects_future_version() {
        let mut header = encode_header();
        header[4..8].copy_from_slice(&99u32.to_le_bytes());
        assert!(matches!(
            decode_header(&header),
            Err(FormatError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_schema_record_round_trip() {
        let record = Record::Schema(sample_schema());
        let bytes = record.to_bytes();
        let decoded = Record::from_body(&bytes[4..], 0).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_channel_record_round_trip() {
        let record = Record::Channel(sample_channel());
        let bytes = record.to_bytes();
        let decoded = Record::from_body(&bytes[4..], 0).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_message_record_round_trip() {
        let record = Record::Message(Message {
            channel_id: 2,
            log_time: 1_700_000_000_000_000_000,
            publish_time: 1_699_999_999_000_000_000,
            data: vec![0xde, 0xad, 0xbe, 0xef],
        });
        let bytes = record.to_bytes();
        let decoded = Record::from_body(&bytes[4..], 0).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_corrupt_payload_fails_checksum() {
        let record = Record::Schema(sample_schema());
        let mut bytes = record.to_bytes();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;
        assert!(matches!(
            Record::from_body(&bytes[4..], 7),
            Err(FormatError::ChecksumMismatch { offset: 7 })
        ));
    }

    #[test]
    fn test_unknown_opcode_is_malformed() {
        // Build a record body with a bogus opcode but a valid CRC.
        let mut body = vec![0x7Fu8];
        body.extend_from_slice(b"junk");
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&body);
        let crc = hasher.finalize();
        body.extend_from_slice(&crc.to_le_bytes());
        assert!(matches!(
            Record::from_body(&body, 0),
            Err(FormatError::Malformed(_))
        ));
    }
}
