//! Read-only context shared by every line component
//!
//! Built once by the viewer from the loaded configuration and handed to each
//! component as an `Arc`. Components never reach for process-wide state.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::LineEvent;
use crate::config::{DisplayConfig, TranslationConfig};
use crate::document::{LineId, SharedDocument};
use crate::scroll::{ScrollCoordinator, ScrollOptions, ScrollRequest};
use crate::translate::Translator;

pub struct LineContext {
    pub display: DisplayConfig,
    pub translation: TranslationConfig,
    pub document: SharedDocument,
    pub scroll: Arc<dyn ScrollCoordinator>,
    pub listeners: OutsideClickListeners,
    pub events: mpsc::UnboundedSender<LineEvent>,
    pub translator: Arc<Translator>,
}

impl LineContext {
    /// Pop-out presentation: editing, selection and the translate control are off
    pub fn is_detached(&self) -> bool {
        self.display.detached
    }

    pub fn scroll_request(&self) -> ScrollRequest {
        ScrollRequest {
            coordinator: Arc::clone(&self.scroll),
            options: ScrollOptions::from_display(&self.display),
        }
    }

    pub fn milestone(&self, id: &LineId) -> Option<String> {
        self.document.lock().milestone(id).map(str::to_string)
    }

    pub(crate) fn emit(&self, event: LineEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("Line event dropped, viewer has shut down");
        }
    }
}

/// Lines waiting to hear about pointer-downs anywhere in the viewer
///
/// The viewer offers every pointer-down to these lines before routing it
/// normally, so an editing line sees clicks that land on other lines.
#[derive(Debug, Clone, Default)]
pub struct OutsideClickListeners(Arc<Mutex<Vec<LineId>>>);

impl OutsideClickListeners {
    /// Returns false if the line was already registered
    pub fn register(&self, id: LineId) -> bool {
        let mut ids = self.0.lock();
        if ids.contains(&id) {
            return false;
        }
        ids.push(id);
        true
    }

    /// Returns false if the line was not registered
    pub fn unregister(&self, id: &LineId) -> bool {
        let mut ids = self.0.lock();
        let before = ids.len();
        ids.retain(|registered| registered != id);
        ids.len() != before
    }

    pub fn snapshot(&self) -> Vec<LineId> {
        self.0.lock().clone()
    }
}
