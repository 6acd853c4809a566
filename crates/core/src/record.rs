//! Logical records of a log container.
//!
//! A container holds schema definitions, channel definitions, and timestamped
//! messages. Definitions are immutable once read. Identifier fields hold
//! source-local ids when read from an input and global ids once the registry
//! has remapped them; the structs themselves do not distinguish the two.

use std::collections::BTreeMap;

/// Nanoseconds since the Unix epoch.
pub type Timestamp = u64;

/// A schema definition as declared by a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDef {
    /// Schema identifier (local to the declaring container, or global in output)
    pub id: u16,

    /// Schema name (e.g. a message type name)
    pub name: String,

    /// Encoding of the schema body (e.g. "jsonschema", "ros2msg")
    pub encoding: String,

    /// Schema body bytes
    pub data: Vec<u8>,
}

/// A channel definition binding a topic to a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDef {
    /// Channel identifier (local to the declaring container, or global in output)
    pub id: u16,

    /// Identifier of the channel's schema, in the same id space as `id`
    pub schema_id: u16,

    /// Topic name
    pub topic: String,

    /// Message encoding (e.g. "json", "cdr")
    pub message_encoding: String,

    /// Free-form channel metadata. BTreeMap keeps encoding deterministic.
    pub metadata: BTreeMap<String, String>,
}

/// One timestamped message on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Channel identifier, in the id space of the containing container
    pub channel_id: u16,

    /// Arrival time; the primary sort key for merging
    pub log_time: Timestamp,

    /// Publish time as recorded by the producer
    pub publish_time: Timestamp,

    /// Payload bytes, opaque to the merge
    pub data: Vec<u8>,
}

impl Message {
    /// Copy of this message re-stamped to `t` (both timestamps) on channel
    /// `channel_id`. Used when replaying latched values at a later instant.
    pub fn restamped(&self, channel_id: u16, t: Timestamp) -> Message {
        Message {
            channel_id,
            log_time: t,
            publish_time: t,
            data: self.data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restamped_overwrites_both_timestamps() {
        let msg = Message {
            channel_id: 3,
            log_time: 100,
            publish_time: 90,
            data: vec![1, 2, 3],
        };

        let replay = msg.restamped(7, 500);
        assert_eq!(replay.channel_id, 7);
        assert_eq!(replay.log_time, 500);
        assert_eq!(replay.publish_time, 500);
        assert_eq!(replay.data, msg.data);
    }
}
