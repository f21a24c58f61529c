use crate::errors::MidiResult;
use crate::validation::{ValidationConfig, ValidationFinding};
use bytes::Bytes;

pub trait MidiParser {
    fn from_bytes(data: &mut Bytes) -> MidiResult<Self>
    where
        Self: Sized;
}

/// Structural checks a decoded component can run on itself
pub trait MidiValidate {
    fn validate(&self, config: &ValidationConfig) -> Vec<ValidationFinding>;
}
