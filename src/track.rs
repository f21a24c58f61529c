use bytes::{Buf, Bytes};
use serde::{Deserialize, Serialize};

use crate::{
    chunk::RawChunk,
    errors::{MidiError, MidiResult},
    events::{decode_payload, Event},
    traits::MidiParser,
    utils::read_vlq,
    ParserConfig, ResourceTracker,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// 1-based, counting track chunks only
    pub number: usize,
    /// Declared payload length of the chunk
    pub length: u32,
    pub events: Vec<Event>,
}

/// Status and time carried from one event to the next
#[derive(Debug, Clone, Copy, Default)]
struct StreamState {
    previous_absolute: u64,
    previous_status: u8,
}

impl Track {
    /// Decode the events of an `MTrk` chunk
    pub fn from_chunk(
        chunk: &RawChunk,
        number: usize,
        config: &ParserConfig,
        tracker: &mut ResourceTracker,
    ) -> MidiResult<Self> {
        let track = Self::from_payload(
            chunk.payload.clone(),
            number,
            chunk.number,
            config,
            tracker,
        )?;
        log::debug!(
            "Decoded track {} ({} bytes, {} events, ends at tick {})",
            track.number,
            track.length,
            track.events.len(),
            track.end_time()
        );
        Ok(track)
    }

    /// Decode a bare track payload
    ///
    /// Runs until every payload byte is consumed; an event reaching past the
    /// end fails the whole track. Errors are wrapped in `TrackDecode` with
    /// the failing event's position.
    pub fn from_payload(
        mut data: Bytes,
        number: usize,
        chunk_number: usize,
        config: &ParserConfig,
        tracker: &mut ResourceTracker,
    ) -> MidiResult<Self> {
        let length = data.len() as u32;
        let mut state = StreamState::default();
        let mut events = Vec::new();

        while data.has_remaining() {
            let event_number = events.len() + 1;
            let offset = length as usize - data.remaining();

            let event = Self::decode_event(event_number, &mut data, state, config, tracker)
                .map_err(|source| MidiError::TrackDecode {
                    chunk: chunk_number,
                    track: number,
                    event: event_number,
                    offset,
                    source: Box::new(source),
                })?;
            log::trace!("{}", event);

            state = StreamState {
                previous_absolute: event.absolute,
                previous_status: event.status,
            };
            events.push(event);
        }

        Ok(Track {
            number,
            length,
            events,
        })
    }

    fn decode_event(
        number: usize,
        data: &mut Bytes,
        state: StreamState,
        config: &ParserConfig,
        tracker: &mut ResourceTracker,
    ) -> MidiResult<Event> {
        tracker.track_event(config)?;

        let delta = read_vlq(data, config.max_vlq_bytes, "delta-time")?;
        let absolute = state
            .previous_absolute
            .checked_add(delta)
            .ok_or_else(|| MidiError::IntegerOverflow {
                operation: "absolute time".to_string(),
                details: format!("{} + {}", state.previous_absolute, delta),
            })?;

        let peeked = *data
            .first()
            .ok_or_else(|| MidiError::truncated("status byte", 1, 0))?;

        // A data byte where the status should be: reuse the previous status
        // and leave the byte for the payload.
        let running_status = peeked & 0x80 == 0;
        let status = if running_status {
            state.previous_status
        } else {
            data.advance(1);
            peeked
        };

        let decoded = decode_payload(status, data, config)?;

        Ok(Event {
            number,
            delta,
            absolute,
            status,
            channel: status & 0x0F,
            running_status,
            kind: decoded.kind,
            payload: decoded.payload,
        })
    }

    /// Absolute time of the last event
    pub fn end_time(&self) -> u64 {
        self.events.last().map(|event| event.absolute).unwrap_or(0)
    }

    pub fn has_end_of_track(&self) -> bool {
        self.events.last().map(Event::is_end_of_track).unwrap_or(false)
    }

    /// Track name from the first TrackName meta event, if any
    pub fn name(&self) -> Option<String> {
        use crate::events::{EventKind, MetaType};

        self.events
            .iter()
            .find(|event| event.kind == EventKind::Meta(MetaType::TrackName))
            .and_then(|event| event.payload.text_lossy())
    }
}

impl MidiParser for Track {
    /// Decode a bare track payload as track 1 with default limits
    fn from_bytes(data: &mut Bytes) -> MidiResult<Self> {
        let payload = data.split_to(data.len());
        Self::from_payload(
            payload,
            1,
            0,
            &ParserConfig::default(),
            &mut ResourceTracker::new(),
        )
    }
}
