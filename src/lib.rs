pub mod chunk;
pub mod errors;
pub mod events;
pub mod header;
pub mod parser_config;
pub mod track;
pub mod traits;
pub mod utils;
pub mod validation;

pub use chunk::*;
pub use errors::*;
pub use events::*;
pub use header::*;
pub use parser_config::*;
pub use track::*;
pub use traits::*;
pub use utils::{encode_vlq, is_smf};
pub use validation::*;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiFile {
    pub header: HeaderData,
    /// Every `MTrk` chunk in file order; may differ from the declared count
    pub tracks: Vec<Track>,
}

impl MidiFile {
    /// Parse a MIDI file from path with default limits, no validation
    pub fn from_path(path: &str) -> MidiResult<Self> {
        Self::from_path_with_config(path, ParserConfig::default())
    }

    /// Parse a MIDI file from path with custom parser configuration
    pub fn from_path_with_config(path: &str, parser_config: ParserConfig) -> MidiResult<Self> {
        let mut data = Self::read_file(path, &parser_config)?;
        Self::from_bytes_with_config(&mut data, parser_config)
    }

    /// Parse a MIDI file from path, then run structural validation
    pub fn from_path_with_full_config(
        path: &str,
        validation_config: ValidationConfig,
        parser_config: ParserConfig,
    ) -> MidiResult<Self> {
        let mut data = Self::read_file(path, &parser_config)?;
        Self::from_bytes_with_full_config(&mut data, parser_config, validation_config)
    }

    fn read_file(path: &str, parser_config: &ParserConfig) -> MidiResult<Bytes> {
        let file_data = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MidiError::FileNotFound {
                path: path.to_string(),
                io_kind: Some(e.kind()),
            },
            std::io::ErrorKind::PermissionDenied => MidiError::PermissionDenied {
                path: path.to_string(),
            },
            _ => MidiError::FileReadError {
                path: path.to_string(),
                reason: e.to_string(),
            },
        })?;

        parser_config.check_file_size(file_data.len())?;
        log::debug!("Read {} bytes from {}", file_data.len(), path);

        Ok(Bytes::from(file_data))
    }

    /// Parse a MIDI file from bytes with validation
    pub fn from_bytes_validated(data: &mut Bytes, config: ValidationConfig) -> MidiResult<Self> {
        Self::from_bytes_with_full_config(data, ParserConfig::default(), config)
    }

    /// Parse a MIDI file from bytes with parser configuration (no validation)
    ///
    /// The first chunk must be `MThd`. After it, `MTrk` chunks are decoded in
    /// order until the input ends exactly at a chunk boundary; any other chunk
    /// type aborts the parse.
    pub fn from_bytes_with_config(
        data: &mut Bytes,
        parser_config: ParserConfig,
    ) -> MidiResult<Self> {
        let mut resource_tracker = ResourceTracker::new();

        let header_chunk = match read_chunk(data, &parser_config, &mut resource_tracker)? {
            Some(chunk) if chunk.kind == ChunkKind::Header => chunk,
            Some(chunk) => {
                return Err(MidiError::MissingHeader {
                    found: chunk.tag_str(),
                })
            },
            None => {
                return Err(MidiError::MissingHeader {
                    found: "end of data".to_string(),
                })
            },
        };
        let header = HeaderData::from_bytes(&mut header_chunk.payload.clone())?;
        log::debug!(
            "Header: format {} ({}), {} tracks declared, division {:?}",
            header.format as u16,
            header.format.description(),
            header.track_count,
            header.division
        );

        let mut tracks = Vec::new();
        while let Some(chunk) = read_chunk(data, &parser_config, &mut resource_tracker)? {
            match chunk.kind {
                ChunkKind::Track => {
                    let number = resource_tracker.track_track(&parser_config)?;
                    tracks.push(Track::from_chunk(
                        &chunk,
                        number,
                        &parser_config,
                        &mut resource_tracker,
                    )?);
                },
                ChunkKind::Header => {
                    log::warn!("Ignoring additional header chunk ({})", chunk);
                },
                ChunkKind::Unsupported => {
                    return Err(MidiError::UnsupportedChunk {
                        tag: chunk.tag_str(),
                        chunk: chunk.number,
                    });
                },
            }
        }

        log::debug!("Decoded file: {}", resource_tracker.get_usage_summary());

        Ok(MidiFile { header, tracks })
    }

    /// Parse a MIDI file from bytes with both parser and validation configuration
    pub fn from_bytes_with_full_config(
        data: &mut Bytes,
        parser_config: ParserConfig,
        validation_config: ValidationConfig,
    ) -> MidiResult<Self> {
        let midi_file = Self::from_bytes_with_config(data, parser_config)?;
        midi_file.validate_with_config(validation_config)?;
        Ok(midi_file)
    }

    /// Validate this file with the given configuration
    pub fn validate_with_config(&self, config: ValidationConfig) -> MidiResult<ValidationReport> {
        MidiValidator::new(config).validate_midi_file(&self.header, &self.tracks)
    }

    /// Validate this file with default configuration
    pub fn validate(&self) -> MidiResult<ValidationReport> {
        self.validate_with_config(ValidationConfig::default())
    }

    pub fn format(&self) -> Format {
        self.header.format
    }

    pub fn division(&self) -> TimeDivision {
        self.header.division
    }

    /// Track count as written in the header
    pub fn declared_track_count(&self) -> u16 {
        self.header.track_count
    }

    /// Number of track chunks actually decoded
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn event_count(&self) -> usize {
        self.tracks.iter().map(|track| track.events.len()).sum()
    }

    pub fn has_sysex(&self) -> bool {
        self.tracks.iter().flat_map(|track| &track.events).any(|event| {
            matches!(
                event.kind,
                EventKind::SystemExclusive | EventKind::SystemExclusivePacket
            )
        })
    }

    /// `(absolute tick, microseconds per quarter note)` for every SetTempo
    /// event, ordered by time
    pub fn tempo_changes(&self) -> Vec<(u64, u64)> {
        let mut changes: Vec<(u64, u64)> = self
            .tracks
            .iter()
            .flat_map(|track| &track.events)
            .filter_map(|event| event.tempo().map(|tempo| (event.absolute, tempo)))
            .collect();
        changes.sort_by_key(|(absolute, _)| *absolute);
        changes
    }
}

impl MidiParser for MidiFile {
    fn from_bytes(data: &mut Bytes) -> MidiResult<Self> {
        Self::from_bytes_with_config(data, ParserConfig::default())
    }
}
