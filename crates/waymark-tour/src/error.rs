#![forbid(unsafe_code)]

use std::fmt;

use waymark_core::event::{SpotId, TourId};
use waymark_marker::MarkerError;

/// How a navigation target was named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotRef {
    Index(usize),
    Id(SpotId),
}

impl fmt::Display for SpotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "index {i}"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Why an extension was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    /// The id was empty or blank.
    EmptyId,
    /// Another extension already uses this id.
    Duplicate(String),
    /// The initialization hook failed.
    Init { id: String, reason: String },
}

impl fmt::Display for ExtensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => f.write_str("extension id must not be empty"),
            Self::Duplicate(id) => write!(f, "extension '{id}' is already registered"),
            Self::Init { id, reason } => write!(f, "extension '{id}' failed to initialize: {reason}"),
        }
    }
}

impl std::error::Error for ExtensionError {}

/// Errors raised by tours, spots and the guide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourError {
    /// A spot was built without a usable anchor.
    InvalidSpot(String),
    /// A spot was built without an owning tour.
    MissingTour,
    /// A navigation target does not exist in the tour.
    BadSpot { tour: TourId, target: SpotRef },
    /// No tour with this id exists in the guide.
    UnknownTour(TourId),
    /// Marker options were rejected.
    Marker(MarkerError),
    /// An extension was refused.
    BadExtension(ExtensionError),
}

impl fmt::Display for TourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSpot(reason) => write!(f, "invalid spot: {reason}"),
            Self::MissingTour => f.write_str("spot has no owning tour"),
            Self::BadSpot { tour, target } => write!(f, "{tour} has no spot at {target}"),
            Self::UnknownTour(id) => write!(f, "unknown {id}"),
            Self::Marker(e) => write!(f, "marker error: {e}"),
            Self::BadExtension(e) => write!(f, "bad extension: {e}"),
        }
    }
}

impl std::error::Error for TourError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Marker(e) => Some(e),
            Self::BadExtension(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MarkerError> for TourError {
    fn from(e: MarkerError) -> Self {
        Self::Marker(e)
    }
}

impl From<ExtensionError> for TourError {
    fn from(e: ExtensionError) -> Self {
        Self::BadExtension(e)
    }
}
