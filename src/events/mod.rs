//! MIDI Events Module
//!
//! The event model and the status-byte driven payload decoder used by the
//! track decoder.

pub mod event;
pub mod parsing;


pub use event::{Event, EventKind, EventPayload, KeyMode, MetaType};
pub use parsing::{
    decode_payload, DecodedPayload, META_EVENT, SYSTEM_EXCLUSIVE, SYSTEM_EXCLUSIVE_PACKET,
};
