#![forbid(unsafe_code)]

//! Marker placement engine.
//!
//! A marker is a small badge attached next to, inside, or floating over a
//! spot's anchor element. This crate decides where it goes:
//!
//! - [`Placement`]: which structural strategy attaches it (inline,
//!   sibling inside a synthesized wrapper, or overlay on a shared layer).
//! - [`Position`]: which of eight sides or corners it occupies.
//! - [`layout`]: pure margin and offset math, testable without a document.
//! - [`Marker`]: the lifecycle that builds, shows, places, hides and
//!   removes the element through a [`Document`](waymark_core::Document).

pub mod error;
pub mod layout;
pub mod marker;
pub mod placement;

pub use error::MarkerError;
pub use marker::{Marker, MarkerContent, MarkerSettings, Stage, Template, marker_defaults};
pub use placement::{Placement, Position};
