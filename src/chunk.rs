use std::fmt;

use bytes::{Buf, Bytes};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{MidiError, MidiResult},
    utils::{read_bytes, read_uint_be, tag_to_string, MTHD_MAGIC, MTRK_MAGIC},
    ParserConfig, ResourceTracker,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkKind {
    Header,
    Track,
    Unsupported,
}

impl ChunkKind {
    pub fn from_tag(tag: &[u8; 4]) -> Self {
        match *tag {
            MTHD_MAGIC => ChunkKind::Header,
            MTRK_MAGIC => ChunkKind::Track,
            _ => ChunkKind::Unsupported,
        }
    }
}

/// One `{tag}{length}{payload}` record of the top-level stream
#[derive(Debug, Clone, PartialEq)]
pub struct RawChunk {
    /// Diagnostic sequence number, 1-based within one decode call
    pub number: usize,
    pub tag: [u8; 4],
    pub kind: ChunkKind,
    /// Declared payload length
    pub length: u32,
    pub payload: Bytes,
}

impl RawChunk {
    pub fn tag_str(&self) -> String {
        tag_to_string(&self.tag)
    }
}

impl fmt::Display for RawChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunk {} - Type: '{}' ({:#010x}), Length: {} bytes",
            self.number,
            self.tag_str(),
            u32::from_be_bytes(self.tag),
            self.length
        )
    }
}

/// Read the next chunk from the top-level stream
///
/// Returns `Ok(None)` when the stream is exhausted exactly at a chunk
/// boundary. Any shortfall after the first tag byte is `Truncated`.
pub fn read_chunk(
    data: &mut Bytes,
    config: &ParserConfig,
    tracker: &mut ResourceTracker,
) -> MidiResult<Option<RawChunk>> {
    if !data.has_remaining() {
        return Ok(None);
    }

    let number = tracker.next_chunk();

    let tag_bytes = read_bytes(data, 4, "chunk type")?;
    let mut tag = [0u8; 4];
    tag.copy_from_slice(&tag_bytes);

    let length = read_uint_be(data, 4, "chunk length")? as u32;
    config.check_chunk_length(length)?;

    let payload = read_bytes(data, length as usize, "chunk payload")?;

    let chunk = RawChunk {
        number,
        tag,
        kind: ChunkKind::from_tag(&tag),
        length,
        payload,
    };
    log::debug!("{}", chunk);

    Ok(Some(chunk))
}
