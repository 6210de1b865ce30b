#![forbid(unsafe_code)]

//! Core: geometry, the host document seam, layered options and events.
//!
//! # Role in Waymark
//! `waymark-core` is the foundation the marker engine and the tour state
//! machine build on. It owns no tour semantics of its own.
//!
//! # Primary responsibilities
//! - **Document**: the trait every structural mutation and layout read
//!   flows through, plus [`memory::MemoryDocument`] for tests and headless
//!   hosts.
//! - **Options**: [`options::OptionSet`], the mini-language parser and
//!   four-layer resolution.
//! - **Events**: [`event::Signal`], per-entity [`event::EventBus`] and the
//!   guide-level [`event::Outbox`].
//! - **Scheduling**: [`schedule::TaskQueue`] for work that waits on layout,
//!   [`schedule::ResizeThrottle`] for resize storms.
//! - **Config**: [`config::GuideConfig`], loadable from TOML/JSON.

pub mod config;
pub mod document;
pub mod event;
pub mod geometry;
pub mod logging;
pub mod memory;
pub mod options;
pub mod schedule;

pub use document::{Document, ElementRole, ElementSpec, NodeId, Positioning};
pub use event::{EventBus, ListenerId, Outbox, Signal, SpotId, TourId};
pub use geometry::{Point, Rect, Side, Sides, Size};
pub use memory::MemoryDocument;
pub use options::{OptionError, OptionSet, OptionValue, Optionable};
