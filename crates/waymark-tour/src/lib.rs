#![forbid(unsafe_code)]

//! Tours: spots, the navigation state machine and the guide context.
//!
//! # Role in Waymark
//! `waymark-tour` decides *which* spot is current and drives the marker
//! engine from `waymark-marker` accordingly.
//!
//! # Example
//!
//! ```
//! use waymark_core::document::Document;
//! use waymark_core::geometry::{Rect, Size};
//! use waymark_core::memory::MemoryDocument;
//! use waymark_tour::{Guide, SpotBuilder};
//!
//! let mut doc = MemoryDocument::new(Size::new(1024.0, 768.0));
//! let root = doc.root();
//! let save = doc.insert(root, "button");
//! doc.set_rect(save, Rect::new(20.0, 20.0, 80.0, 30.0));
//!
//! let mut guide = Guide::new(doc);
//! let id = guide.tour("intro");
//! let mut tour = guide.tour_mut(id)?;
//! tour.add_spot(SpotBuilder::node(save).caption("Save"))?;
//! tour.start()?;
//! assert_eq!(tour.tour().cursor(), Some(0));
//! # Ok::<(), waymark_tour::TourError>(())
//! ```

pub mod error;
pub mod extension;
pub mod guide;
pub mod spot;
pub mod tour;

pub use error::{ExtensionError, SpotRef, TourError};
pub use extension::{Extension, Extensions};
pub use guide::{Guide, TourHandle};
pub use spot::{Bounce, Spot, SpotBuilder};
pub use tour::{FocusTarget, Tour};
