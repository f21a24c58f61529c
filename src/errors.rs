use std::fmt;
use thiserror::Error;

/// Error type for Standard MIDI File decoding
///
/// Every variant is fatal to the decode that produced it: no partial file,
/// track or event list is ever returned alongside an error. Unknown meta
/// sub-events are not errors and never show up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MidiError {
    // ========== I/O ERRORS (1000-1099) ==========
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        io_kind: Option<std::io::ErrorKind>,
    },

    /// Error reading file contents
    #[error("Failed to read file {path}: {reason}")]
    FileReadError { path: String, reason: String },

    /// Permission denied when accessing file
    #[error("Permission denied accessing file: {path}")]
    PermissionDenied { path: String },

    // ========== FORMAT ERRORS (2000-2099) ==========
    /// The stream does not start with an `MThd` chunk
    #[error("Expected an 'MThd' header chunk first, found {found}")]
    MissingHeader { found: String },

    /// A top-level chunk other than `MThd`/`MTrk`
    #[error("Unsupported chunk type '{tag}' (chunk {chunk})")]
    UnsupportedChunk { tag: String, chunk: usize },

    /// Header format number outside 0..=2
    #[error("Unsupported MIDI file format {format}")]
    UnsupportedFormat { format: u16 },

    // ========== DATA PARSING ERRORS (3000-3099) ==========
    /// Not enough bytes left for a fixed field, a VLQ or a declared length
    #[error("Truncated data reading {field}: needed {needed} bytes, only {available} available")]
    Truncated {
        field: String,
        needed: usize,
        available: usize,
    },

    /// Variable-length quantity longer than the configured bound
    #[error("Variable-length quantity exceeds {max_bytes} bytes")]
    VlqTooLong { max_bytes: usize },

    // ========== EVENT ERRORS (4000-4099) ==========
    /// Status byte is neither a channel-voice message nor meta/sysex
    #[error("Unsupported event status 0x{status:02X}")]
    UnsupportedEvent { status: u8 },

    /// A failure inside a track, with the position it happened at
    #[error("Chunk {chunk}, track {track}, event {event} (payload offset {offset}): {source}")]
    TrackDecode {
        chunk: usize,
        track: usize,
        event: usize,
        offset: usize,
        #[source]
        source: Box<MidiError>,
    },

    // ========== MEMORY AND RESOURCE ERRORS (6000-6099) ==========
    /// Integer overflow in calculations
    #[error("Integer overflow in {operation}: {details}")]
    IntegerOverflow { operation: String, details: String },

    /// Data size exceeds configured limits
    #[error("Data size exceeds limit for {field}: {size} (limit: {limit})")]
    DataSizeExceedsLimit {
        field: String,
        size: usize,
        limit: usize,
    },

    // ========== LOGICAL VALIDATION ERRORS (7000-7099) ==========
    /// Structural inconsistency found by strict validation
    #[error("Data inconsistency in {context}: {reason}")]
    InconsistentData { context: String, reason: String },
}

impl MidiError {
    /// Shorthand for a `Truncated` error
    pub fn truncated(field: &str, needed: usize, available: usize) -> Self {
        MidiError::Truncated {
            field: field.to_string(),
            needed,
            available,
        }
    }

    /// Get the error code for machine-readable processing
    pub fn code(&self) -> u16 {
        match self {
            // I/O Errors (1000-1099)
            Self::FileNotFound { .. } => 1001,
            Self::FileReadError { .. } => 1002,
            Self::PermissionDenied { .. } => 1003,

            // Format Errors (2000-2099)
            Self::MissingHeader { .. } => 2001,
            Self::UnsupportedChunk { .. } => 2002,
            Self::UnsupportedFormat { .. } => 2003,

            // Data Parsing Errors (3000-3099)
            Self::Truncated { .. } => 3001,
            Self::VlqTooLong { .. } => 3002,

            // Event Errors (4000-4099)
            Self::UnsupportedEvent { .. } => 4001,
            Self::TrackDecode { .. } => 4002,

            // Memory and Resource Errors (6000-6099)
            Self::IntegerOverflow { .. } => 6001,
            Self::DataSizeExceedsLimit { .. } => 6002,

            // Logical Validation Errors (7000-7099)
            Self::InconsistentData { .. } => 7001,
        }
    }

    /// Get the error category for grouping related errors
    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            1000..=1099 => ErrorCategory::IO,
            2000..=2099 => ErrorCategory::Format,
            3000..=3099 => ErrorCategory::DataParsing,
            4000..=4099 => ErrorCategory::EventParsing,
            6000..=6099 => ErrorCategory::MemoryResource,
            7000..=7099 => ErrorCategory::LogicalValidation,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Innermost error, looking through `TrackDecode` position wrappers
    pub fn root(&self) -> &MidiError {
        match self {
            Self::TrackDecode { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if the error leaves anything usable behind
    ///
    /// Decoding a byte buffer is deterministic, so only validation findings
    /// (which are raised on an already decoded file) count as recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.root(), Self::InconsistentData { .. })
    }

    /// Get suggested action for handling this error
    pub fn suggested_action(&self) -> &'static str {
        match self.root() {
            Self::FileNotFound { .. } => "Check file path and ensure file exists",
            Self::PermissionDenied { .. } => "Check file permissions and user access rights",
            Self::MissingHeader { .. } => "Verify this is a valid Standard MIDI File",
            Self::UnsupportedChunk { .. } => {
                "File contains a chunk type this decoder does not handle (RIFF wrapped or corrupted?)"
            },
            Self::Truncated { .. } => "File appears to be corrupted or truncated",
            Self::VlqTooLong { .. } => {
                "File appears to be corrupted, or use a permissive parser configuration"
            },
            Self::UnsupportedEvent { .. } => "Track data is corrupted or uses an unsupported status byte",
            Self::DataSizeExceedsLimit { .. } => "Raise the parser configuration limits",
            Self::InconsistentData { .. } => "Disable strict validation to accept this file",
            _ => "Check file integrity and Standard MIDI File compliance",
        }
    }
}

/// Error categories for grouping related error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    IO,
    Format,
    DataParsing,
    EventParsing,
    MemoryResource,
    LogicalValidation,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IO => write!(f, "I/O"),
            Self::Format => write!(f, "Format"),
            Self::DataParsing => write!(f, "Data Parsing"),
            Self::EventParsing => write!(f, "Event Parsing"),
            Self::MemoryResource => write!(f, "Memory/Resource"),
            Self::LogicalValidation => write!(f, "Logical Validation"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Result type alias for MIDI decoding operations
pub type MidiResult<T> = Result<T, MidiError>;

impl From<std::io::Error> for MidiError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => MidiError::FileNotFound {
                path: "unknown".to_string(),
                io_kind: Some(err.kind()),
            },
            std::io::ErrorKind::PermissionDenied => MidiError::PermissionDenied {
                path: "unknown".to_string(),
            },
            _ => MidiError::FileReadError {
                path: "unknown".to_string(),
                reason: err.to_string(),
            },
        }
    }
}
