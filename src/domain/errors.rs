//! Domain error types
//!
//! This module defines the error hierarchy for CObs. Every failure aborts the
//! current build; durably committed progress from earlier jobs is never rolled back.
//! Errors are domain-specific and don't expose third-party types.

use std::fmt;
use thiserror::Error;

/// The specific check a source row or event failed
///
/// Checks run in a fixed order (columns, date, cases, tests, positivity, mortality,
/// hospitalizations) and only the first violation is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowViolation {
    /// Row did not have exactly six columns
    WrongNumberOfColumns,
    /// Date could not be parsed
    DateUnreadable,
    /// Daily new cases could not be parsed
    CasesUnreadable,
    /// Daily new cases was negative
    CasesNegative,
    /// Tests could not be parsed
    TestsUnreadable,
    /// Tests was negative
    TestsNegative,
    /// Positivity could not be parsed
    PositivityUnreadable,
    /// Positivity was outside the inclusive range [0, 100]
    PositivityOutOfRange,
    /// Mortality could not be parsed
    MortalityUnreadable,
    /// Mortality was negative
    MortalityNegative,
    /// Hospitalizations could not be parsed
    HospitalizationsUnreadable,
    /// Hospitalizations was negative
    HospitalizationsNegative,
}

impl fmt::Display for RowViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::WrongNumberOfColumns => "had wrong number of columns",
            Self::DateUnreadable => "had unreadable date",
            Self::CasesUnreadable => "had unreadable daily new cases",
            Self::CasesNegative => "had negative daily new cases",
            Self::TestsUnreadable => "had unreadable Tests",
            Self::TestsNegative => "had negative Tests",
            Self::PositivityUnreadable => "had unreadable Positivity",
            Self::PositivityOutOfRange => "had Positivity not between 0 and 100",
            Self::MortalityUnreadable => "had unreadable Mortality",
            Self::MortalityNegative => "had negative Mortality",
            Self::HospitalizationsUnreadable => "had unreadable Hospitalizations",
            Self::HospitalizationsNegative => "had negative Hospitalizations",
        };
        f.write_str(message)
    }
}

/// Main CObs error type
#[derive(Debug, Error)]
pub enum CobsError {
    /// A source row or event failed validation
    #[error("validation error at row {ordinal}: row {violation}")]
    RowValidation {
        /// 1-based row or event ordinal
        ordinal: usize,
        /// First violated check
        violation: RowViolation,
    },

    /// The merged series has a date gap
    #[error("timeline not contiguous")]
    Contiguity,

    /// The store could not be reached or read
    #[error("access error: {0}")]
    Access(String),

    /// An event payload could not be decoded
    #[error("malformed event at ordinal {ordinal}: {message}")]
    Decode {
        /// 1-based event ordinal
        ordinal: usize,
        /// Decoder message
        message: String,
    },

    /// Fewer raw days than the scenario engine needs
    #[error("insufficient data: {available} day(s) available, minimum is {minimum}")]
    InsufficientData {
        /// Number of validated days
        available: usize,
        /// `max(lags) + 1`
        minimum: usize,
    },

    /// Another build has appended past this build's registered position
    #[error("build superseded by a newer build")]
    Superseded,

    /// An append violated its expected-position precondition
    #[error("commit conflict on stream '{stream}': expected position {expected}, found {actual}")]
    CommitConflict {
        /// Stream that rejected the append
        stream: String,
        /// Position the append expected
        expected: String,
        /// Position actually found
        actual: String,
    },

    /// Scenario engine failures
    #[error("scenario engine error: {0}")]
    Engine(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl CobsError {
    /// Process exit code for this error
    ///
    /// 1 = build failure, 2 = configuration error, 4 = store access error, 5 = fatal.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::RowValidation { .. }
            | Self::Contiguity
            | Self::Decode { .. }
            | Self::InsufficientData { .. }
            | Self::Superseded
            | Self::CommitConflict { .. }
            | Self::Engine(_) => 1,
            Self::Configuration(_) => 2,
            Self::Access(_) | Self::Io(_) => 4,
            Self::Serialization(_) => 5,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for CobsError {
    fn from(err: std::io::Error) -> Self {
        CobsError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CobsError {
    fn from(err: serde_json::Error) -> Self {
        CobsError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CobsError {
    fn from(err: toml::de::Error) -> Self {
        CobsError::Configuration(format!("TOML parse error: {err}"))
    }
}
