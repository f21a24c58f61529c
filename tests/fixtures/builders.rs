//! Standard MIDI File Test Data Generators and Builders
//!
//! Builders write raw SMF bytes directly so tests exercise the decoder
//! against the byte layout, not against a serializer of our own model.

use smf_parser::encode_vlq;

/// Main builder for creating SMF test files with fluent API
#[derive(Debug, Clone)]
pub struct SmfBuilder {
    format: u16,
    declared_tracks: Option<u16>,
    division: u16,
    header_extra: Vec<u8>,
    chunks: Vec<([u8; 4], Vec<u8>)>,
}

impl Default for SmfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SmfBuilder {
    /// Format 1, 480 ticks per quarter note, no tracks
    pub fn new() -> Self {
        Self {
            format: 1,
            declared_tracks: None,
            division: 480,
            header_extra: Vec::new(),
            chunks: Vec::new(),
        }
    }

    pub fn format(mut self, format: u16) -> Self {
        self.format = format;
        self
    }

    /// Raw 16-bit division field
    pub fn division(mut self, division: u16) -> Self {
        self.division = division;
        self
    }

    /// SMPTE division from a negative frame rate code and ticks per frame
    pub fn smpte_division(mut self, frames_per_second_code: i8, ticks_per_frame: u8) -> Self {
        self.division = u16::from_be_bytes([frames_per_second_code as u8, ticks_per_frame]);
        self
    }

    /// Override the header's track count; defaults to the number of tracks added
    pub fn declared_tracks(mut self, count: u16) -> Self {
        self.declared_tracks = Some(count);
        self
    }

    /// Extra bytes appended to the header payload
    pub fn header_extra(mut self, bytes: &[u8]) -> Self {
        self.header_extra.extend_from_slice(bytes);
        self
    }

    /// Configure and add a track
    pub fn track<F>(mut self, f: F) -> Self
    where
        F: FnOnce(TrackBuilder) -> TrackBuilder,
    {
        self.chunks.push((*b"MTrk", f(TrackBuilder::new()).build()));
        self
    }

    /// Add a chunk with an arbitrary tag
    pub fn raw_chunk(mut self, tag: &[u8; 4], payload: &[u8]) -> Self {
        self.chunks.push((*tag, payload.to_vec()));
        self
    }

    pub fn build_bytes(self) -> Vec<u8> {
        let track_count = self.chunks.iter().filter(|(tag, _)| tag == b"MTrk").count() as u16;

        let mut header = Vec::new();
        header.extend_from_slice(&self.format.to_be_bytes());
        header.extend_from_slice(&self.declared_tracks.unwrap_or(track_count).to_be_bytes());
        header.extend_from_slice(&self.division.to_be_bytes());
        header.extend_from_slice(&self.header_extra);

        let mut bytes = Vec::new();
        write_chunk(&mut bytes, b"MThd", &header);
        for (tag, payload) in &self.chunks {
            write_chunk(&mut bytes, tag, payload);
        }
        bytes
    }
}

pub fn write_chunk(buffer: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) {
    buffer.extend_from_slice(tag);
    buffer.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buffer.extend_from_slice(payload);
}

/// Builder for one `MTrk` payload
///
/// With `running_status()` enabled, a channel-voice status equal to the
/// previous event's status is omitted.
#[derive(Debug, Clone, Default)]
pub struct TrackBuilder {
    bytes: Vec<u8>,
    running_status: bool,
    last_status: Option<u8>,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn running_status(mut self) -> Self {
        self.running_status = true;
        self
    }

    fn event(mut self, delta: u64, status: u8, data: &[u8]) -> Self {
        self.bytes.extend(encode_vlq(delta));
        let omit = self.running_status && status < 0xF0 && self.last_status == Some(status);
        if !omit {
            self.bytes.push(status);
        }
        self.bytes.extend_from_slice(data);
        self.last_status = Some(status);
        self
    }

    pub fn note_on(self, delta: u64, channel: u8, note: u8, velocity: u8) -> Self {
        self.event(delta, 0x90 | channel, &[note, velocity])
    }

    pub fn note_off(self, delta: u64, channel: u8, note: u8, velocity: u8) -> Self {
        self.event(delta, 0x80 | channel, &[note, velocity])
    }

    pub fn controller(self, delta: u64, channel: u8, controller: u8, value: u8) -> Self {
        self.event(delta, 0xB0 | channel, &[controller, value])
    }

    pub fn program_change(self, delta: u64, channel: u8, program: u8) -> Self {
        self.event(delta, 0xC0 | channel, &[program])
    }

    pub fn channel_pressure(self, delta: u64, channel: u8, pressure: u8) -> Self {
        self.event(delta, 0xD0 | channel, &[pressure])
    }

    /// Data bytes in stream order
    pub fn pitch_bend(self, delta: u64, channel: u8, first: u8, second: u8) -> Self {
        self.event(delta, 0xE0 | channel, &[first, second])
    }

    /// Meta event with an explicit body; the length is written from `data`
    pub fn meta(self, delta: u64, meta_type: u8, data: &[u8]) -> Self {
        let mut body = vec![meta_type];
        body.extend(encode_vlq(data.len() as u64));
        body.extend_from_slice(data);
        self.event(delta, 0xFF, &body)
    }

    pub fn tempo(self, delta: u64, microseconds_per_quarter: u32) -> Self {
        let bytes = microseconds_per_quarter.to_be_bytes();
        self.meta(delta, 0x51, &bytes[1..])
    }

    pub fn time_signature(self, delta: u64, numerator: u8, log2_denominator: u8) -> Self {
        self.meta(delta, 0x58, &[numerator, log2_denominator, 24, 8])
    }

    pub fn key_signature(self, delta: u64, fifths: i8, minor: bool) -> Self {
        self.meta(delta, 0x59, &[fifths as u8, minor as u8])
    }

    pub fn track_name(self, delta: u64, name: &str) -> Self {
        self.meta(delta, 0x03, name.as_bytes())
    }

    pub fn text(self, delta: u64, text: &str) -> Self {
        self.meta(delta, 0x01, text.as_bytes())
    }

    pub fn sysex(self, delta: u64, data: &[u8]) -> Self {
        let mut body = encode_vlq(data.len() as u64);
        body.extend_from_slice(data);
        self.event(delta, 0xF0, &body)
    }

    pub fn end_of_track(self, delta: u64) -> Self {
        self.meta(delta, 0x2F, &[])
    }

    /// Append bytes as-is
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// A short melody: program change, three notes, end of track
    pub fn simple_melody(self, channel: u8) -> Self {
        self.program_change(0, channel, 0)
            .note_on(0, channel, 60, 100)
            .note_off(480, channel, 60, 0)
            .note_on(0, channel, 64, 100)
            .note_off(480, channel, 64, 0)
            .note_on(0, channel, 67, 100)
            .note_off(480, channel, 67, 0)
            .end_of_track(0)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Typical well-formed files
pub struct SmfGenerators;

impl SmfGenerators {
    /// Format 0, one track with tempo, time signature and a melody
    pub fn format0_basic() -> SmfBuilder {
        SmfBuilder::new().format(0).division(96).track(|t| {
            t.tempo(0, 500_000)
                .time_signature(0, 4, 2)
                .note_on(0, 0, 60, 100)
                .note_off(96, 0, 60, 0)
                .end_of_track(0)
        })
    }

    /// Format 1, a conductor track and two instrument tracks
    pub fn format1_multitrack() -> SmfBuilder {
        SmfBuilder::new()
            .format(1)
            .division(480)
            .track(|t| {
                t.track_name(0, "Conductor")
                    .tempo(0, 500_000)
                    .time_signature(0, 3, 2)
                    .key_signature(0, -2, false)
                    .tempo(1440, 400_000)
                    .end_of_track(0)
            })
            .track(|t| t.track_name(0, "Piano").simple_melody(0))
            .track(|t| {
                // Note-offs as zero-velocity note-ons, so the status repeats
                t.track_name(0, "Bass")
                    .running_status()
                    .note_on(0, 1, 40, 100)
                    .note_on(480, 1, 40, 0)
                    .note_on(0, 1, 43, 100)
                    .note_on(480, 1, 43, 0)
                    .end_of_track(0)
            })
    }
}

/// Malformed files for error testing
pub struct InvalidSmfGenerators;

impl InvalidSmfGenerators {
    /// A track chunk where the header should be
    pub fn track_first() -> Vec<u8> {
        let mut bytes = Vec::new();
        write_chunk(&mut bytes, b"MTrk", &[0x00, 0xFF, 0x2F, 0x00]);
        bytes
    }

    /// Valid file cut in the middle of its last chunk
    pub fn truncated_file() -> Vec<u8> {
        let mut bytes = SmfGenerators::format0_basic().build_bytes();
        bytes.truncate(bytes.len() - 3);
        bytes
    }

    /// Track whose last event reaches past the declared chunk length
    pub fn event_past_chunk_end() -> Vec<u8> {
        SmfBuilder::new()
            .format(0)
            .track(|t| t.note_on(0, 0, 60, 100).raw(&[0x10, 0x90, 0x3C]))
            .build_bytes()
    }

    /// Running status with no previous status in the track
    pub fn running_status_at_start() -> Vec<u8> {
        SmfBuilder::new()
            .format(0)
            .track(|t| t.raw(&[0x00, 0x3C, 0x40]))
            .build_bytes()
    }

    /// System common message, which a file may not contain
    pub fn system_common_status() -> Vec<u8> {
        SmfBuilder::new()
            .format(0)
            .track(|t| t.raw(&[0x00, 0xF2, 0x00, 0x00]))
            .build_bytes()
    }

    /// Delta time with five continuation bytes
    pub fn overlong_vlq() -> Vec<u8> {
        SmfBuilder::new()
            .format(0)
            .track(|t| t.raw(&[0x81, 0x81, 0x81, 0x81, 0x81, 0x00, 0x90, 0x3C, 0x40]))
            .build_bytes()
    }
}
