#![forbid(unsafe_code)]

use std::fmt;

use waymark_core::NodeId;

/// Marker construction and attachment errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    /// `placement` was not one of `inline`, `sibling`, `overlay`.
    BadPlacement(String),
    /// `position` was not one of the eight compass points.
    BadPosition(String),
    /// The anchor is not connected to the document.
    AnchorDetached(NodeId),
}

impl fmt::Display for MarkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadPlacement(value) => write!(f, "unrecognized marker placement '{value}'"),
            Self::BadPosition(value) => write!(f, "unrecognized marker position '{value}'"),
            Self::AnchorDetached(node) => write!(f, "marker anchor {node} is not attached"),
        }
    }
}

impl std::error::Error for MarkerError {}
