use std::fmt;

use crate::errors::{MidiError, MidiResult};
use crate::traits::MidiValidate;
use crate::{Format, HeaderData, Track};

/// Configuration for structural validation rules
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Whether to fail on the first finding instead of only logging it
    pub strict_mode: bool,
    /// Check that every track ends with an EndOfTrack meta event
    pub require_end_of_track: bool,
    /// Check the header's track count against the decoded tracks
    pub require_declared_track_count: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            require_end_of_track: true,
            require_declared_track_count: true,
        }
    }
}

impl ValidationConfig {
    /// Strict configuration: every check enabled, first finding is an error
    pub fn strict() -> Self {
        Self {
            strict_mode: true,
            ..Self::default()
        }
    }
}

/// One structural problem found in a decoded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFinding {
    pub context: String,
    pub reason: String,
}

impl ValidationFinding {
    fn new(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub fn into_error(self) -> MidiError {
        MidiError::InconsistentData {
            context: self.context,
            reason: self.reason,
        }
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.reason)
    }
}

/// Findings collected by a non-strict validation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub findings: Vec<ValidationFinding>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Per-track structure checks
pub struct TrackValidator;

impl TrackValidator {
    /// EndOfTrack must be the last event, and nothing may follow it
    pub fn validate_end_of_track(track: &Track, findings: &mut Vec<ValidationFinding>) {
        let context = format!("Track {}", track.number);

        if let Some(position) = track.events.iter().position(|e| e.is_end_of_track()) {
            let trailing = track.events.len() - position - 1;
            if trailing > 0 {
                findings.push(ValidationFinding::new(
                    context.clone(),
                    format!("{} events follow End of Track", trailing),
                ));
            }
        }

        if !track.has_end_of_track() {
            findings.push(ValidationFinding::new(
                context,
                "Track does not end with an End of Track event",
            ));
        }
    }

    /// Absolute times must never go backwards
    pub fn validate_timing(track: &Track, findings: &mut Vec<ValidationFinding>) {
        let backwards = track
            .events
            .windows(2)
            .find(|pair| pair[1].absolute < pair[0].absolute);

        if let Some(pair) = backwards {
            findings.push(ValidationFinding::new(
                format!("Track {} event {}", track.number, pair[1].number),
                format!(
                    "Absolute time {} precedes previous event time {}",
                    pair[1].absolute, pair[0].absolute
                ),
            ));
        }
    }
}

impl MidiValidate for Track {
    fn validate(&self, config: &ValidationConfig) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();
        if config.require_end_of_track {
            TrackValidator::validate_end_of_track(self, &mut findings);
        }
        TrackValidator::validate_timing(self, &mut findings);
        findings
    }
}

/// Header against track list checks
pub struct ConsistencyValidator;

impl ConsistencyValidator {
    pub fn validate_track_count(
        header: &HeaderData,
        tracks: &[Track],
        findings: &mut Vec<ValidationFinding>,
    ) {
        if header.track_count as usize != tracks.len() {
            findings.push(ValidationFinding::new(
                "Header track count",
                format!(
                    "Header declares {} tracks but {} were decoded",
                    header.track_count,
                    tracks.len()
                ),
            ));
        }
    }

    pub fn validate_format(
        header: &HeaderData,
        tracks: &[Track],
        findings: &mut Vec<ValidationFinding>,
    ) {
        if header.format == Format::SingleTrack && tracks.len() != 1 {
            findings.push(ValidationFinding::new(
                "Header format",
                format!("Format 0 file contains {} tracks", tracks.len()),
            ));
        }
    }
}

/// Main validator that coordinates all validation checks
pub struct MidiValidator {
    config: ValidationConfig,
}

impl MidiValidator {
    /// Create a new validator with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Run every enabled check over a decoded file
    ///
    /// Findings are logged as warnings. In strict mode the first one is
    /// returned as `InconsistentData`; otherwise they are all reported.
    pub fn validate_midi_file(
        &self,
        header: &HeaderData,
        tracks: &[Track],
    ) -> MidiResult<ValidationReport> {
        let mut findings = Vec::new();

        if self.config.require_declared_track_count {
            ConsistencyValidator::validate_track_count(header, tracks, &mut findings);
        }
        ConsistencyValidator::validate_format(header, tracks, &mut findings);

        for track in tracks {
            findings.extend(track.validate(&self.config));
        }

        for finding in &findings {
            log::warn!("{}", finding);
        }

        if self.config.strict_mode {
            if let Some(finding) = findings.into_iter().next() {
                return Err(finding.into_error());
            }
            return Ok(ValidationReport::default());
        }

        Ok(ValidationReport { findings })
    }
}

impl Default for MidiValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
