//! Identifier registry.
//!
//! Each source numbers its schemas and channels independently; the registry
//! unifies them into one dense global id space for the output. Content
//! equality is the only merge criterion: two sources declaring byte-identical
//! definitions under different local ids map to one global definition, and
//! identical local ids from different sources imply nothing.
//!
//! Global ids are arena indices plus one (0 is never issued); source-local
//! ids are forgotten as soon as a message has been remapped.

use std::collections::{BTreeMap, HashMap};

use bagmerge_core::{ChannelDef, SchemaDef};

use crate::source::SourceError;

/// Content key for schema deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SchemaKey {
    name: String,
    encoding: String,
    data: Vec<u8>,
}

/// Content key for channel deduplication. The schema id here is the schema's
/// *global* id, so channels only unify when their schemas already did.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ChannelKey {
    topic: String,
    message_encoding: String,
    schema_id: u16,
    metadata: BTreeMap<String, String>,
}

/// Per-run registry mapping (source, local id) pairs to global definitions.
///
/// Owned by the assembler for the duration of one run and passed by `&mut`
/// into the merge engines; no state survives the run.
#[derive(Debug, Default)]
pub struct Registry {
    /// Arena of unified schemas; `schemas[i].id == i + 1`
    schemas: Vec<SchemaDef>,

    /// Arena of unified channels with globalized ids; `channels[i].id == i + 1`
    channels: Vec<ChannelDef>,

    schema_keys: HashMap<SchemaKey, u16>,
    channel_keys: HashMap<ChannelKey, u16>,

    /// (source ordinal, local schema id) -> global schema id
    source_schemas: HashMap<(usize, u16), u16>,

    /// (source ordinal, local channel id) -> global channel id
    source_channels: HashMap<(usize, u16), u16>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Registry::default()
    }

    /// Register a schema declared by `source`, returning its global id.
    ///
    /// The first registration of a content key allocates the next global id;
    /// later registrations of an equal key from any source reuse it. Fails
    /// once the global id space is exhausted.
    pub fn register_schema(
        &mut self,
        source: usize,
        schema: &SchemaDef,
    ) -> Result<u16, SourceError> {
        let key = SchemaKey {
            name: schema.name.clone(),
            encoding: schema.encoding.clone(),
            data: schema.data.clone(),
        };

        let global = match self.schema_keys.get(&key) {
            Some(&id) => id,
            None => {
                let id = Self::next_global_id(self.schemas.len())?;
                self.schemas.push(SchemaDef {
                    id,
                    ..schema.clone()
                });
                self.schema_keys.insert(key, id);
                id
            }
        };

        self.source_schemas.insert((source, schema.id), global);
        Ok(global)
    }

    /// Register a channel declared by `source`, returning its global id.
    ///
    /// Fails when the channel references a schema local id the source never
    /// declared, which marks a malformed or truncated source.
    pub fn register_channel(
        &mut self,
        source: usize,
        channel: &ChannelDef,
    ) -> Result<u16, SourceError> {
        let schema_global = *self
            .source_schemas
            .get(&(source, channel.schema_id))
            .ok_or(SourceError::MissingSchema {
                channel_id: channel.id,
                schema_id: channel.schema_id,
            })?;

        let key = ChannelKey {
            topic: channel.topic.clone(),
            message_encoding: channel.message_encoding.clone(),
            schema_id: schema_global,
            metadata: channel.metadata.clone(),
        };

        let global = match self.channel_keys.get(&key) {
            Some(&id) => id,
            None => {
                let id = Self::next_global_id(self.channels.len())?;
                self.channels.push(ChannelDef {
                    id,
                    schema_id: schema_global,
                    ..channel.clone()
                });
                self.channel_keys.insert(key, id);
                id
            }
        };

        self.source_channels.insert((source, channel.id), global);
        Ok(global)
    }

    /// Next dense global id for an arena of `len` entries.
    ///
    /// Ids are u16 on the wire and 0 is never issued, so an arena caps out
    /// at 65535 entries.
    fn next_global_id(len: usize) -> Result<u16, SourceError> {
        if len >= u16::MAX as usize {
            return Err(SourceError::DefinitionOverflow);
        }
        Ok((len + 1) as u16)
    }

    /// Resolve a message's local channel id to its global id.
    pub fn remap_message(&self, source: usize, channel_id: u16) -> Result<u16, SourceError> {
        self.source_channels
            .get(&(source, channel_id))
            .copied()
            .ok_or(SourceError::UnknownChannel { channel_id })
    }

    /// The unified channel a source-local channel id maps to, if registered.
    pub fn channel_for_source(&self, source: usize, channel_id: u16) -> Option<&ChannelDef> {
        let global = *self.source_channels.get(&(source, channel_id))?;
        self.channel(global)
    }

    /// Look up a unified channel by global id.
    pub fn channel(&self, global: u16) -> Option<&ChannelDef> {
        self.channels.get(global.checked_sub(1)? as usize)
    }

    /// Look up a unified schema by global id.
    pub fn schema(&self, global: u16) -> Option<&SchemaDef> {
        self.schemas.get(global.checked_sub(1)? as usize)
    }

    /// Number of unified schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Number of unified channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
