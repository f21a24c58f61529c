use bytes::{Buf, Bytes};

use crate::errors::{MidiError, MidiResult};

/// Header chunk tag, also the magic bytes of a Standard MIDI File
pub const MTHD_MAGIC: [u8; 4] = *b"MThd";

/// Track chunk tag
pub const MTRK_MAGIC: [u8; 4] = *b"MTrk";

/// Detect if data is a Standard MIDI File by checking magic bytes
pub fn is_smf(data: &[u8]) -> bool {
    data.len() >= 4 && data[0..4] == MTHD_MAGIC
}

fn ensure_remaining(data: &Bytes, needed: usize, field: &str) -> MidiResult<()> {
    if data.remaining() < needed {
        return Err(MidiError::truncated(field, needed, data.remaining()));
    }
    Ok(())
}

/// Read a single byte
pub fn read_u8(data: &mut Bytes, field: &str) -> MidiResult<u8> {
    ensure_remaining(data, 1, field)?;
    Ok(data.get_u8())
}

/// Read `n` bytes as one big-endian unsigned integer
///
/// `n == 0` yields 0. Widths above 8 bytes do not fit the result and fail
/// with `IntegerOverflow` without consuming anything.
pub fn read_uint_be(data: &mut Bytes, n: usize, field: &str) -> MidiResult<u64> {
    if n > 8 {
        return Err(MidiError::IntegerOverflow {
            operation: format!("reading {}", field),
            details: format!("{} byte big-endian integer does not fit in 64 bits", n),
        });
    }
    ensure_remaining(data, n, field)?;
    if n == 0 {
        return Ok(0);
    }
    Ok(data.get_uint(n))
}

/// Split off the next `n` bytes
pub fn read_bytes(data: &mut Bytes, n: usize, field: &str) -> MidiResult<Bytes> {
    ensure_remaining(data, n, field)?;
    Ok(data.split_to(n))
}

/// Read a MIDI variable-length quantity
///
/// Seven bits per byte, most significant group first, high bit set on every
/// byte but the last. More than `max_bytes` bytes fails with `VlqTooLong`,
/// unless the input ends first, which is `Truncated`.
pub fn read_vlq(data: &mut Bytes, max_bytes: usize, field: &str) -> MidiResult<u64> {
    let mut value: u64 = 0;
    let mut count = 0;

    loop {
        // Running out of input is always reported as truncation, even past the cap
        if !data.has_remaining() {
            return Err(MidiError::truncated(field, count + 1, count));
        }
        if count == max_bytes {
            return Err(MidiError::VlqTooLong { max_bytes });
        }

        let byte = data.get_u8();
        count += 1;
        value = (value << 7) | (byte & 0x7F) as u64;

        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
}

/// Encode a value as a MIDI variable-length quantity
pub fn encode_vlq(value: u64) -> Vec<u8> {
    let mut groups = vec![(value & 0x7F) as u8];
    let mut remaining = value >> 7;

    while remaining > 0 {
        groups.push(((remaining & 0x7F) as u8) | 0x80);
        remaining >>= 7;
    }

    groups.reverse();
    groups
}

/// Printable form of a chunk tag, escaping anything outside ASCII
pub fn tag_to_string(tag: &[u8]) -> String {
    tag.iter()
        .flat_map(|b| std::ascii::escape_default(*b))
        .map(char::from)
        .collect()
}
