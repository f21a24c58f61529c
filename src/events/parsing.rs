//! Event Payload Decoding
//!
//! Turns an effective status byte plus the bytes that follow it into an
//! `EventKind`/`EventPayload` pair. Channel-voice messages are matched on the
//! high nibble first; only when that fails is the full status byte looked at
//! for meta and system-exclusive events.

use bytes::{Buf, Bytes};

use super::event::{EventKind, EventPayload, KeyMode, MetaType};
use crate::errors::{MidiError, MidiResult};
use crate::utils::{read_bytes, read_u8, read_uint_be, read_vlq};
use crate::ParserConfig;

pub const META_EVENT: u8 = 0xFF;
pub const SYSTEM_EXCLUSIVE: u8 = 0xF0;
pub const SYSTEM_EXCLUSIVE_PACKET: u8 = 0xF7;

/// Result of decoding one event body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub kind: EventKind,
    pub payload: EventPayload,
    /// Bytes taken from the cursor, status byte excluded
    pub consumed: usize,
}

/// Decode the payload that follows `status`
pub fn decode_payload(
    status: u8,
    data: &mut Bytes,
    config: &ParserConfig,
) -> MidiResult<DecodedPayload> {
    let start = data.remaining();

    let (kind, payload) = match decode_channel_voice(status, data, config)? {
        Some(decoded) => decoded,
        None => match status {
            META_EVENT => decode_meta(data, config)?,
            SYSTEM_EXCLUSIVE | SYSTEM_EXCLUSIVE_PACKET => decode_sysex(status, data, config)?,
            _ => return Err(MidiError::UnsupportedEvent { status }),
        },
    };

    Ok(DecodedPayload {
        kind,
        payload,
        consumed: start - data.remaining(),
    })
}

fn decode_channel_voice(
    status: u8,
    data: &mut Bytes,
    config: &ParserConfig,
) -> MidiResult<Option<(EventKind, EventPayload)>> {
    let decoded = match status & 0xF0 {
        0x80 | 0x90 | 0xA0 => {
            let kind = match status & 0xF0 {
                0x80 => EventKind::NoteOff,
                0x90 => EventKind::NoteOn,
                _ => EventKind::PolyphonicKeyPressure,
            };
            let number = read_u8(data, "note number")?;
            let velocity = read_u8(data, "note velocity")?;
            (kind, EventPayload::Note { number, velocity })
        },
        0xB0 => {
            let controller = read_u8(data, "controller number")?;
            let value = read_u8(data, "controller value")?;
            (
                EventKind::ControllerChange,
                EventPayload::ControllerChange { controller, value },
            )
        },
        0xC0 | 0xD0 => {
            let kind = if status & 0xF0 == 0xC0 {
                EventKind::ProgramChange
            } else {
                EventKind::ChannelPressure
            };
            let value = read_u8(data, "amount")? as u64;
            (kind, EventPayload::Amount { value })
        },
        0xE0 => {
            let first = read_u8(data, "pitch bend")?;
            let second = read_u8(data, "pitch bend")?;
            (
                EventKind::PitchBend,
                EventPayload::PitchBend {
                    value: config.pitch_bend_order.assemble(first, second),
                },
            )
        },
        _ => return Ok(None),
    };

    Ok(Some(decoded))
}

fn read_length(data: &mut Bytes, config: &ParserConfig, field: &str) -> MidiResult<usize> {
    let length = read_vlq(data, config.max_vlq_bytes, field)?;
    usize::try_from(length).map_err(|_| MidiError::IntegerOverflow {
        operation: format!("reading {}", field),
        details: format!("length {} does not fit in memory", length),
    })
}

fn decode_meta(data: &mut Bytes, config: &ParserConfig) -> MidiResult<(EventKind, EventPayload)> {
    let type_code = read_u8(data, "meta type")?;
    let length = read_length(data, config, "meta length")?;

    // Fixed-size fields are read from the payload start even when the declared
    // length is shorter; the declared length alone decides where the next event starts.
    let mut fields = data.clone();
    let mut body = read_bytes(data, length, "meta data")?;
    let meta_type = MetaType::from_byte(type_code);

    let payload = match meta_type {
        MetaType::SetTempo | MetaType::ChannelPrefix => EventPayload::Amount {
            value: read_uint_be(&mut body, length, "meta value")?,
        },
        MetaType::KeySignature => {
            let fifths = read_u8(&mut fields, "key signature fifths")? as i8;
            let mode = if read_u8(&mut fields, "key signature mode")? != 0 {
                KeyMode::Minor
            } else {
                KeyMode::Major
            };
            EventPayload::KeySignature { fifths, mode }
        },
        MetaType::TimeSignature => EventPayload::TimeSignature {
            numerator: read_u8(&mut fields, "time signature numerator")?,
            log2_denominator: read_u8(&mut fields, "time signature denominator")?,
            midi_clocks_per_click: read_u8(&mut fields, "time signature clocks per click")?,
            thirtyseconds_per_quarter: read_u8(&mut fields, "time signature 32nds per quarter")?,
        },
        MetaType::TrackName
        | MetaType::Text
        | MetaType::Lyric
        | MetaType::CuePoint
        | MetaType::Copyright => EventPayload::Text {
            length,
            bytes: body.to_vec(),
        },
        MetaType::SmpteOffset => EventPayload::SmpteOffset {
            hour: read_u8(&mut fields, "SMPTE offset hour")?,
            minute: read_u8(&mut fields, "SMPTE offset minute")?,
            second: read_u8(&mut fields, "SMPTE offset second")?,
            frame: read_u8(&mut fields, "SMPTE offset frame")?,
            subframe: read_u8(&mut fields, "SMPTE offset subframe")?,
        },
        MetaType::EndOfTrack => {
            if length != 0 {
                log::warn!("End of track meta event carries {} data bytes, skipped", length);
            }
            EventPayload::EndOfTrack
        },
        _ => {
            log::debug!(
                "Skipping unknown meta event 0x{:02X} ({:?}, {} bytes)",
                type_code,
                meta_type,
                length
            );
            EventPayload::UnknownMeta {
                type_code,
                skipped_length: length,
            }
        },
    };

    Ok((EventKind::Meta(meta_type), payload))
}

fn decode_sysex(
    status: u8,
    data: &mut Bytes,
    config: &ParserConfig,
) -> MidiResult<(EventKind, EventPayload)> {
    let kind = if status == SYSTEM_EXCLUSIVE {
        EventKind::SystemExclusive
    } else {
        EventKind::SystemExclusivePacket
    };
    let length = read_length(data, config, "sysex length")?;
    let bytes = read_bytes(data, length, "sysex data")?.to_vec();

    Ok((kind, EventPayload::SysEx { length, bytes }))
}
