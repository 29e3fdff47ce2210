//! Error types for the sequencer

use crate::ids::CardId;

/// Errors raised while building a session or validating a transition.
///
/// Runtime asset failures never surface here; they are absorbed by the
/// fail-open readiness policy and only logged.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SequencerError {
    /// A state machine was asked to move somewhere it cannot go
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    /// Card id not present in the page layout
    #[error("Unknown card: {id}")]
    UnknownCard { id: CardId },

    /// Two cards share the same id
    #[error("Duplicate card: {id}")]
    DuplicateCard { id: CardId },

    /// Hero timeline configured without slides
    #[error("Hero timeline has no slides")]
    EmptyTimeline,

    /// Hero timeline does not line up with the slides on the page
    #[error("Hero timeline has {timeline} slides but the page has {page}")]
    TimelineMismatch { timeline: usize, page: usize },

    /// Config or layout could not be parsed
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl SequencerError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "transition",
            Self::UnknownCard { .. } | Self::DuplicateCard { .. } => "layout",
            Self::EmptyTimeline | Self::TimelineMismatch { .. } => "timeline",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for SequencerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
