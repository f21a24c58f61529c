use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{MidiError, MidiResult},
    traits::MidiParser,
    utils::read_uint_be,
};

/// Track layout declared by the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    SingleTrack = 0,
    MultiSync = 1,
    MultiAsync = 2,
}

impl Format {
    pub fn from_u16(value: u16) -> MidiResult<Self> {
        match value {
            0 => Ok(Format::SingleTrack),
            1 => Ok(Format::MultiSync),
            2 => Ok(Format::MultiAsync),
            format => Err(MidiError::UnsupportedFormat { format }),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Format::SingleTrack => "A single multi-channel track",
            Format::MultiSync => "One or more simultaneous tracks (or MIDI outputs) of a sequence",
            Format::MultiAsync => "One or more sequentially independent single-track patterns",
        }
    }
}

/// The four canonical SMPTE frame rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmpteFps {
    TwentyFour,
    TwentyFive,
    /// 29.97 fps drop-frame
    TwentyNine,
    Thirty,
}

impl SmpteFps {
    /// Map the signed frame-rate code stored in the division's high byte
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -24 => Some(SmpteFps::TwentyFour),
            -25 => Some(SmpteFps::TwentyFive),
            -29 => Some(SmpteFps::TwentyNine),
            -30 => Some(SmpteFps::Thirty),
            _ => None,
        }
    }

    pub fn frames_per_second(&self) -> f64 {
        match self {
            SmpteFps::TwentyFour => 24.0,
            SmpteFps::TwentyFive => 25.0,
            SmpteFps::TwentyNine => 30_000.0 / 1001.0,
            SmpteFps::Thirty => 30.0,
        }
    }
}

/// Tick resolution of the file. Bit 15 of the raw field picks the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeDivision {
    TicksPerQuarterNote(u16),
    Smpte {
        frames_per_second_code: i8,
        ticks_per_frame: u8,
    },
}

impl TimeDivision {
    pub fn from_raw(raw: u16) -> Self {
        if raw & 0x8000 == 0 {
            TimeDivision::TicksPerQuarterNote(raw & 0x7FFF)
        } else {
            let [high, low] = raw.to_be_bytes();
            TimeDivision::Smpte {
                frames_per_second_code: high as i8,
                ticks_per_frame: low,
            }
        }
    }

    pub fn ticks_per_quarter_note(&self) -> Option<u16> {
        match self {
            TimeDivision::TicksPerQuarterNote(ticks) => Some(*ticks),
            TimeDivision::Smpte { .. } => None,
        }
    }

    /// `None` for quarter-note timing and for non-canonical frame codes
    pub fn smpte_fps(&self) -> Option<SmpteFps> {
        match self {
            TimeDivision::Smpte {
                frames_per_second_code,
                ..
            } => SmpteFps::from_code(*frames_per_second_code),
            TimeDivision::TicksPerQuarterNote(_) => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TimeDivision::TicksPerQuarterNote(_) => "Ticks are per quarter-note",
            TimeDivision::Smpte { .. } => "Negative SMPTE format and ticks per frame",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderData {
    pub format: Format,
    /// Track count as declared; advisory only
    pub track_count: u16,
    pub division: TimeDivision,
    pub raw_division: u16,
}

impl MidiParser for HeaderData {
    /// Decode an `MThd` payload (the bytes after tag and length)
    ///
    /// Fields sit at fixed offsets 0, 2 and 4. Anything past the sixth byte
    /// is left unread.
    fn from_bytes(data: &mut Bytes) -> MidiResult<Self> {
        let format = Format::from_u16(read_uint_be(data, 2, "header format")? as u16)?;
        let track_count = read_uint_be(data, 2, "header track count")? as u16;
        let raw_division = read_uint_be(data, 2, "header division")? as u16;

        Ok(HeaderData {
            format,
            track_count,
            division: TimeDivision::from_raw(raw_division),
            raw_division,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_payload(format: u16, tracks: u16, division: u16) -> Bytes {
        let mut payload = Vec::new();
        payload.extend_from_slice(&format.to_be_bytes());
        payload.extend_from_slice(&tracks.to_be_bytes());
        payload.extend_from_slice(&division.to_be_bytes());
        Bytes::from(payload)
    }

    #[test]
    fn test_header_from_bytes() {
        let mut payload = header_payload(1, 3, 0x01E0);
        let header = HeaderData::from_bytes(&mut payload).unwrap();

        assert_eq!(header.format, Format::MultiSync);
        assert_eq!(header.track_count, 3);
        assert_eq!(header.division, TimeDivision::TicksPerQuarterNote(480));
        assert_eq!(header.raw_division, 0x01E0);
    }

    #[test]
    fn test_ticks_per_quarter_note_division() {
        let division = TimeDivision::from_raw(0x00C0);
        assert_eq!(division, TimeDivision::TicksPerQuarterNote(192));
        assert_eq!(division.ticks_per_quarter_note(), Some(192));
        assert_eq!(division.smpte_fps(), None);
    }

    #[test]
    fn test_smpte_division() {
        let division = TimeDivision::from_raw(0xE250);
        assert_eq!(
            division,
            TimeDivision::Smpte {
                frames_per_second_code: -30,
                ticks_per_frame: 80,
            }
        );
        assert_eq!(division.ticks_per_quarter_note(), None);
        assert_eq!(division.smpte_fps(), Some(SmpteFps::Thirty));
        assert_eq!(division.description(), "Negative SMPTE format and ticks per frame");
    }

    #[test]
    fn test_smpte_frame_codes() {
        let cases = [
            (0xE8u8, Some(SmpteFps::TwentyFour)),
            (0xE7, Some(SmpteFps::TwentyFive)),
            (0xE3, Some(SmpteFps::TwentyNine)),
            (0xE2, Some(SmpteFps::Thirty)),
            (0x80, None),
        ];
        for (code, expected) in cases {
            let raw = u16::from_be_bytes([code, 40]);
            assert_eq!(TimeDivision::from_raw(raw).smpte_fps(), expected);
        }
        assert!((SmpteFps::TwentyNine.frames_per_second() - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_unsupported_format() {
        let mut payload = header_payload(3, 1, 96);
        assert_eq!(
            HeaderData::from_bytes(&mut payload),
            Err(MidiError::UnsupportedFormat { format: 3 })
        );
    }

    #[test]
    fn test_header_truncated_data() {
        let mut payload = Bytes::from_static(&[0x00, 0x01, 0x00, 0x02, 0x01]);
        match HeaderData::from_bytes(&mut payload) {
            Err(MidiError::Truncated { field, .. }) => assert_eq!(field, "header division"),
            other => panic!("Expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn test_header_ignores_trailing_bytes() {
        let mut payload = Bytes::from_static(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x60, 0xAA, 0xBB]);
        let header = HeaderData::from_bytes(&mut payload).unwrap();
        assert_eq!(header.format, Format::SingleTrack);
        assert_eq!(header.division, TimeDivision::TicksPerQuarterNote(96));
    }

    #[test]
    fn test_format_descriptions() {
        assert_eq!(Format::SingleTrack.description(), "A single multi-channel track");
        assert!(Format::MultiAsync.description().contains("independent"));
    }
}
