use serde::{Deserialize, Serialize};

use crate::errors::{MidiError, MidiResult};

/// Byte order used to assemble the 14-bit pitch bend value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PitchBendOrder {
    /// `(first << 7) | second`
    #[default]
    MsbFirst,
    /// `(second << 7) | first`, the order the MIDI wire protocol sends
    LsbFirst,
}

impl PitchBendOrder {
    pub fn assemble(&self, first: u8, second: u8) -> u16 {
        let (msb, lsb) = match self {
            PitchBendOrder::MsbFirst => (first, second),
            PitchBendOrder::LsbFirst => (second, first),
        };
        (((msb & 0x7F) as u16) << 7) | (lsb & 0x7F) as u16
    }
}

/// Configuration for resource management and decoding choices
///
/// Limits guard against adversarial input (huge declared lengths, endless
/// continuation bits). They never change how a well-formed file decodes;
/// `pitch_bend_order` is the only knob that affects decoded values.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum number of bytes in a single variable-length quantity
    pub max_vlq_bytes: usize,

    /// Maximum declared length of a single chunk (bytes)
    pub max_chunk_length: u32,

    /// Maximum number of track chunks per file
    pub max_tracks: usize,

    /// Maximum number of events in one track
    pub max_events_per_track: usize,

    /// Maximum number of events across all tracks
    pub max_total_events: usize,

    /// Maximum size of a file read through `from_path` (bytes)
    pub max_file_size: usize,

    /// How pitch bend data bytes are combined
    pub pitch_bend_order: PitchBendOrder,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_vlq_bytes: 5,                   // four continuation bytes, room for padded 28-bit values
            max_chunk_length: 64 * 1024 * 1024, // 64MB per chunk
            max_tracks: u16::MAX as usize,
            max_events_per_track: 1_000_000,
            max_total_events: 4_000_000,
            max_file_size: 128 * 1024 * 1024,
            pitch_bend_order: PitchBendOrder::MsbFirst,
        }
    }
}

impl ParserConfig {
    /// Create a security-focused configuration with strict limits
    pub fn security_focused() -> Self {
        Self {
            max_vlq_bytes: 5,
            max_chunk_length: 4 * 1024 * 1024, // 4MB per chunk
            max_tracks: 256,
            max_events_per_track: 200_000,
            max_total_events: 500_000,
            max_file_size: 8 * 1024 * 1024,
            pitch_bend_order: PitchBendOrder::MsbFirst,
        }
    }

    /// Create a permissive configuration for large or sloppy files
    pub fn permissive() -> Self {
        Self {
            max_vlq_bytes: 9, // 63 bits still fit the u64 accumulator
            max_chunk_length: u32::MAX,
            max_tracks: u16::MAX as usize,
            max_events_per_track: 20_000_000,
            max_total_events: 80_000_000,
            max_file_size: 1024 * 1024 * 1024,
            pitch_bend_order: PitchBendOrder::MsbFirst,
        }
    }

    /// Same limits, different pitch bend byte order
    pub fn with_pitch_bend_order(mut self, order: PitchBendOrder) -> Self {
        self.pitch_bend_order = order;
        self
    }

    /// Check if a declared chunk length is acceptable
    pub fn check_chunk_length(&self, length: u32) -> MidiResult<()> {
        if length > self.max_chunk_length {
            return Err(MidiError::DataSizeExceedsLimit {
                field: "chunk_length".to_string(),
                size: length as usize,
                limit: self.max_chunk_length as usize,
            });
        }
        Ok(())
    }

    /// Check if a file size is acceptable before decoding
    pub fn check_file_size(&self, size: usize) -> MidiResult<()> {
        if size > self.max_file_size {
            return Err(MidiError::DataSizeExceedsLimit {
                field: "file_size".to_string(),
                size,
                limit: self.max_file_size,
            });
        }
        Ok(())
    }
}

/// Resource tracker for one decode call
///
/// Also the owner of the diagnostic chunk numbering, which restarts at 1 for
/// every file.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    /// Number of chunks read so far
    pub chunk_count: usize,

    /// Number of track chunks decoded so far
    pub track_count: usize,

    /// Events decoded in the current track
    pub track_event_count: usize,

    /// Events decoded across all tracks
    pub total_event_count: usize,
}

impl ResourceTracker {
    /// Create a new resource tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chunk and return its 1-based diagnostic number
    pub fn next_chunk(&mut self) -> usize {
        self.chunk_count += 1;
        self.chunk_count
    }

    /// Register a track chunk and return its 1-based track number
    pub fn track_track(&mut self, config: &ParserConfig) -> MidiResult<usize> {
        self.track_count += 1;
        self.track_event_count = 0;

        if self.track_count > config.max_tracks {
            return Err(MidiError::DataSizeExceedsLimit {
                field: "track_count".to_string(),
                size: self.track_count,
                limit: config.max_tracks,
            });
        }

        Ok(self.track_count)
    }

    /// Track a new event being decoded
    pub fn track_event(&mut self, config: &ParserConfig) -> MidiResult<()> {
        self.track_event_count += 1;
        self.total_event_count += 1;

        if self.track_event_count > config.max_events_per_track {
            return Err(MidiError::DataSizeExceedsLimit {
                field: "events_per_track".to_string(),
                size: self.track_event_count,
                limit: config.max_events_per_track,
            });
        }

        if self.total_event_count > config.max_total_events {
            return Err(MidiError::DataSizeExceedsLimit {
                field: "total_events".to_string(),
                size: self.total_event_count,
                limit: config.max_total_events,
            });
        }

        Ok(())
    }

    /// Get current resource usage summary
    pub fn get_usage_summary(&self) -> ResourceUsageSummary {
        ResourceUsageSummary {
            chunk_count: self.chunk_count,
            track_count: self.track_count,
            event_count: self.total_event_count,
        }
    }
}

/// Summary of resource usage for monitoring and debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUsageSummary {
    pub chunk_count: usize,
    pub track_count: usize,
    pub event_count: usize,
}

impl std::fmt::Display for ResourceUsageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {}, Tracks: {}, Events: {}",
            self.chunk_count, self.track_count, self.event_count
        )
    }
}
