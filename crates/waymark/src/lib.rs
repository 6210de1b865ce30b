#![forbid(unsafe_code)]

//! Waymark public facade crate.
//!
//! Re-exports the document seam and option layer from `waymark-core`, the
//! marker engine from `waymark-marker` and the tour state machine from
//! `waymark-tour`, plus a unified [`Error`] and a small prelude.
//!
//! ```
//! use waymark::prelude::*;
//!
//! let mut doc = MemoryDocument::new(Size::new(1280.0, 800.0));
//! let root = doc.root();
//! let search = doc.insert(root, "input");
//! doc.set_id(search, "search");
//! doc.set_rect(search, Rect::new(40.0, 20.0, 300.0, 32.0));
//!
//! let options = OptionSet::parse("marker.placement: overlay, marker.position: bottom")?;
//! let mut guide = Guide::with_config(doc, GuideConfig::default().with_options(options));
//! let id = guide.tour("welcome");
//! let mut tour = guide.tour_mut(id)?;
//! tour.add_spot(SpotBuilder::selector("#search").text("Find anything here"))?;
//! tour.start()?;
//! assert!(tour.tour().current().is_some());
//! # Ok::<(), waymark::Error>(())
//! ```

#[cfg(feature = "config")]
use std::path::Path;

mod error;

pub use error::{Error, Result};

// --- Core re-exports -------------------------------------------------------

pub use waymark_core::config::{ConfigError, GuideConfig};
pub use waymark_core::document::{Document, ElementRole, ElementSpec, NodeId, Positioning};
pub use waymark_core::event::{EventBus, ListenerId, Signal, SpotId, TourId};
pub use waymark_core::geometry::{Point, Rect, Side, Sides, Size};
pub use waymark_core::memory::MemoryDocument;
pub use waymark_core::options::{OptionError, OptionSet, OptionValue, Optionable};

// --- Marker re-exports -----------------------------------------------------

pub use waymark_marker::{Marker, MarkerError, MarkerSettings, Placement, Position};

// --- Tour re-exports -------------------------------------------------------

pub use waymark_tour::{
    Bounce, Extension, ExtensionError, FocusTarget, Guide, Spot, SpotBuilder, Tour, TourError,
    TourHandle,
};

pub use waymark_core as core;
pub use waymark_marker as marker;
pub use waymark_tour as tour;

/// Load a [`GuideConfig`], choosing the format from the file extension
/// (`.json` is JSON, anything else is TOML).
#[cfg(feature = "config")]
pub fn load_config(path: impl AsRef<Path>) -> Result<GuideConfig> {
    let path = path.as_ref();
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => GuideConfig::from_json_file(path)?,
        _ => GuideConfig::from_toml_file(path)?,
    };
    tracing::debug!(path = %path.display(), "guide config loaded");
    Ok(config)
}

/// Install the `WAYMARK_LOG`-filtered fmt subscriber.
#[cfg(feature = "logging")]
pub fn init_logging() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    waymark_core::logging::init()
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Document, Error, Extension, FocusTarget, Guide, GuideConfig, MemoryDocument, OptionSet,
        Placement, Position, Rect, Result, Signal, Size, SpotBuilder, TourHandle,
    };
}
