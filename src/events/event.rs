//! Event Model
//!
//! The decoded form of one track event: timing, status bookkeeping, the
//! message kind and a payload whose shape is fixed by that kind.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyMode {
    Major,
    Minor,
}

/// Meta event type byte (the byte after 0xFF)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetaType {
    SequenceNumber,
    Text,
    Copyright,
    TrackName,
    InstrumentName,
    Lyric,
    Marker,
    CuePoint,
    ChannelPrefix,
    MidiPort,
    EndOfTrack,
    SetTempo,
    SmpteOffset,
    TimeSignature,
    KeySignature,
    SequencerSpecific,
    Other(u8),
}

impl MetaType {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => MetaType::SequenceNumber,
            0x01 => MetaType::Text,
            0x02 => MetaType::Copyright,
            0x03 => MetaType::TrackName,
            0x04 => MetaType::InstrumentName,
            0x05 => MetaType::Lyric,
            0x06 => MetaType::Marker,
            0x07 => MetaType::CuePoint,
            0x20 => MetaType::ChannelPrefix,
            0x21 => MetaType::MidiPort,
            0x2F => MetaType::EndOfTrack,
            0x51 => MetaType::SetTempo,
            0x54 => MetaType::SmpteOffset,
            0x58 => MetaType::TimeSignature,
            0x59 => MetaType::KeySignature,
            0x7F => MetaType::SequencerSpecific,
            other => MetaType::Other(other),
        }
    }

    pub fn to_byte(&self) -> u8 {
        match self {
            MetaType::SequenceNumber => 0x00,
            MetaType::Text => 0x01,
            MetaType::Copyright => 0x02,
            MetaType::TrackName => 0x03,
            MetaType::InstrumentName => 0x04,
            MetaType::Lyric => 0x05,
            MetaType::Marker => 0x06,
            MetaType::CuePoint => 0x07,
            MetaType::ChannelPrefix => 0x20,
            MetaType::MidiPort => 0x21,
            MetaType::EndOfTrack => 0x2F,
            MetaType::SetTempo => 0x51,
            MetaType::SmpteOffset => 0x54,
            MetaType::TimeSignature => 0x58,
            MetaType::KeySignature => 0x59,
            MetaType::SequencerSpecific => 0x7F,
            MetaType::Other(byte) => *byte,
        }
    }
}

/// What kind of message an event is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    NoteOff,
    NoteOn,
    PolyphonicKeyPressure,
    ControllerChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
    Meta(MetaType),
    SystemExclusive,
    SystemExclusivePacket,
}

impl EventKind {
    pub fn is_channel_voice(&self) -> bool {
        !matches!(
            self,
            EventKind::Meta(_) | EventKind::SystemExclusive | EventKind::SystemExclusivePacket
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventPayload {
    /// NoteOff, NoteOn and PolyphonicKeyPressure
    Note { number: u8, velocity: u8 },
    ControllerChange { controller: u8, value: u8 },
    /// ProgramChange and ChannelPressure (one byte), SetTempo and
    /// ChannelPrefix meta events (n-byte big-endian)
    Amount { value: u64 },
    PitchBend { value: u16 },
    KeySignature { fifths: i8, mode: KeyMode },
    TimeSignature {
        numerator: u8,
        log2_denominator: u8,
        midi_clocks_per_click: u8,
        thirtyseconds_per_quarter: u8,
    },
    Text { length: usize, bytes: Vec<u8> },
    SmpteOffset {
        hour: u8,
        minute: u8,
        second: u8,
        frame: u8,
        subframe: u8,
    },
    SysEx { length: usize, bytes: Vec<u8> },
    EndOfTrack,
    UnknownMeta { type_code: u8, skipped_length: usize },
}

impl EventPayload {
    /// Text payloads decoded as (lossy) UTF-8
    pub fn text_lossy(&self) -> Option<String> {
        match self {
            EventPayload::Text { bytes, .. } => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// 1-based position within the track
    pub number: usize,
    /// Ticks since the previous event of the same track
    pub delta: u64,
    /// Running sum of deltas within the track
    pub absolute: u64,
    /// Effective status byte, explicit or inherited
    pub status: u8,
    /// `status & 0x0F`; only meaningful for channel-voice kinds
    pub channel: u8,
    /// True when the status byte was omitted and taken from the previous event
    pub running_status: bool,
    pub kind: EventKind,
    pub payload: EventPayload,
}

impl Event {
    /// Microseconds per quarter note, for SetTempo events only
    pub fn tempo(&self) -> Option<u64> {
        match (&self.kind, &self.payload) {
            (EventKind::Meta(MetaType::SetTempo), EventPayload::Amount { value }) => Some(*value),
            _ => None,
        }
    }

    pub fn voice_channel(&self) -> Option<u8> {
        self.kind.is_channel_voice().then_some(self.channel)
    }

    pub fn is_end_of_track(&self) -> bool {
        matches!(self.payload, EventPayload::EndOfTrack)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:<5} t={:<8} (+{}) status=0x{:02X}{} {:?}",
            self.number,
            self.absolute,
            self.delta,
            self.status,
            if self.running_status { "*" } else { "" },
            self.kind
        )?;
        match &self.payload {
            EventPayload::Text { .. } => {
                write!(f, " {:?}", self.payload.text_lossy().unwrap_or_default())
            },
            EventPayload::SysEx { length, .. } => write!(f, " {} bytes", length),
            payload => write!(f, " {:?}", payload),
        }
    }
}
