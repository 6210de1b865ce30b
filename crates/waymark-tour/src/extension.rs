#![forbid(unsafe_code)]

//! Extension registration and lifecycle dispatch.
//!
//! An extension is a collaborator (a reader panel, a control bar, an
//! analytics sink) that reacts to guide signals. It registers once under a
//! unique id, is initialized with its resolved options, and then receives
//! every flushed signal through the hook named for it, as long as its
//! `enabled` option resolves on for the signal's tour.

use std::fmt;

use waymark_core::event::Signal;
use waymark_core::options::{OptionSet, resolve};

use crate::error::ExtensionError;

/// A lifecycle collaborator.
///
/// `init` is required; every signal hook defaults to doing nothing.
pub trait Extension {
    /// Unique, non-blank registration id. Also the option section the
    /// extension reads (`options.<id>.enabled`).
    fn id(&self) -> &str;

    /// Compiled defaults for the extension's option section.
    fn defaults(&self) -> OptionSet {
        OptionSet::new()
    }

    /// Called once at registration with the extension's options resolved
    /// against the guide-level set. An error refuses the registration.
    fn init(&mut self, options: &OptionSet) -> Result<(), String>;

    fn on_add(&mut self, _signal: &Signal) {}
    /// Runs before the spot's own pre-focus callback and before the spot
    /// takes focus.
    fn on_pre_focus(&mut self, _signal: &Signal) {}
    fn on_focus(&mut self, _signal: &Signal) {}
    fn on_defocus(&mut self, _signal: &Signal) {}
    fn on_start(&mut self, _signal: &Signal) {}
    fn on_stop(&mut self, _signal: &Signal) {}
    fn on_show(&mut self, _signal: &Signal) {}
    fn on_hide(&mut self, _signal: &Signal) {}
    fn on_dismiss(&mut self, _signal: &Signal) {}
    fn on_marking(&mut self, _signal: &Signal) {}
    fn on_marked(&mut self, _signal: &Signal) {}
    fn on_unmarking(&mut self, _signal: &Signal) {}
    fn on_unmarked(&mut self, _signal: &Signal) {}
}

/// Call the hook named for `signal`.
pub fn dispatch(extension: &mut dyn Extension, signal: &Signal) {
    match signal {
        Signal::Add { .. } => extension.on_add(signal),
        Signal::PreFocus { .. } => extension.on_pre_focus(signal),
        Signal::Focus { .. } => extension.on_focus(signal),
        Signal::Defocus { .. } => extension.on_defocus(signal),
        Signal::Start { .. } => extension.on_start(signal),
        Signal::Stop { .. } => extension.on_stop(signal),
        Signal::Show => extension.on_show(signal),
        Signal::Hide => extension.on_hide(signal),
        Signal::Dismiss => extension.on_dismiss(signal),
        Signal::Marking { .. } => extension.on_marking(signal),
        Signal::Marked { .. } => extension.on_marked(signal),
        Signal::Unmarking { .. } => extension.on_unmarking(signal),
        Signal::Unmarked { .. } => extension.on_unmarked(signal),
    }
}

struct Entry {
    extension: Box<dyn Extension>,
    defaults: OptionSet,
}

/// Registered extensions, in registration order.
#[derive(Default)]
pub struct Extensions {
    entries: Vec<Entry>,
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

impl Extensions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate, initialize and store an extension.
    pub fn register(
        &mut self,
        mut extension: Box<dyn Extension>,
        global: &OptionSet,
    ) -> Result<(), ExtensionError> {
        let id = extension.id().trim().to_owned();
        if id.is_empty() {
            return Err(ExtensionError::EmptyId);
        }
        if self.contains(&id) {
            return Err(ExtensionError::Duplicate(id));
        }
        let defaults = extension.defaults();
        let options = resolve(&id, &defaults, Some(global), None, None);
        extension
            .init(&options)
            .map_err(|reason| ExtensionError::Init {
                id: id.clone(),
                reason,
            })?;
        tracing::debug!(extension = %id, "extension registered");
        self.entries.push(Entry {
            extension,
            defaults,
        });
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.extension.id().trim() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.extension.id())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an extension is enabled, resolving `enabled` from its
    /// defaults, the guide-level set and the tour-level set.
    pub fn is_enabled(&self, id: &str, global: &OptionSet, tour: Option<&OptionSet>) -> bool {
        self.entries
            .iter()
            .find(|e| e.extension.id().trim() == id)
            .is_some_and(|e| enabled(e, global, tour))
    }

    /// Deliver a signal to every enabled extension.
    pub fn deliver(&mut self, signal: &Signal, global: &OptionSet, tour: Option<&OptionSet>) {
        for entry in &mut self.entries {
            if enabled(entry, global, tour) {
                dispatch(entry.extension.as_mut(), signal);
            }
        }
    }
}

fn enabled(entry: &Entry, global: &OptionSet, tour: Option<&OptionSet>) -> bool {
    let id = entry.extension.id().trim();
    resolve(id, &entry.defaults, Some(global), tour, None)
        .get_path("enabled")
        .is_none_or(|v| v.is_on())
}
