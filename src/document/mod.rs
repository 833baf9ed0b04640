//! Document store: the ordered collection of lines and their milestones
//!
//! Lines are shared (`SharedLine`) between the store and the line component
//! rendering them. A component mutates its line in place and writes it back
//! into the store at the line's own `index`, which may differ from the
//! position the component was rendered at.

mod follow;
mod loader;

pub use follow::follow_file;
pub use loader::load_document;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::line::EditData;

/// Stable identity of a line, unique within one document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl LineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<usize> for LineId {
    fn from(n: usize) -> Self {
        Self(n.to_string())
    }
}

/// One addressable unit of source text plus its translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineId,

    /// Position in the store; assigned on insertion
    #[serde(default)]
    pub index: usize,

    pub text: String,

    /// Present only after a translation call completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,

    /// Translation is obscured until hovered or the unblur timer fires
    #[serde(default)]
    pub blur_translation: bool,
}

impl LineItem {
    pub fn new(id: impl Into<LineId>, index: usize, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            index,
            text: text.into(),
            translation: None,
            blur_translation: false,
        }
    }
}

impl From<&str> for LineId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A line shared between the store and its component
pub type SharedLine = Arc<Mutex<LineItem>>;

/// The document shared between the viewer and every line component
pub type SharedDocument = Arc<Mutex<Document>>;

/// Ordered lines plus milestone labels keyed by line identity
#[derive(Debug, Default)]
pub struct Document {
    lines: Vec<SharedLine>,
    milestones: HashMap<LineId, String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    /// Insert a fully formed line, re-indexing it to its new position
    pub fn push(&mut self, mut line: LineItem) -> SharedLine {
        line.index = self.lines.len();
        let shared = Arc::new(Mutex::new(line));
        self.lines.push(Arc::clone(&shared));
        shared
    }

    /// Append new source text; the id is the next free numeric position
    pub fn push_text(&mut self, text: impl Into<String>) -> SharedLine {
        let index = self.lines.len();
        self.push(LineItem::new(index, index, text))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.lines.len().checked_sub(1)
    }

    pub fn get(&self, index: usize) -> Option<SharedLine> {
        self.lines.get(index).cloned()
    }

    /// All lines in store order
    pub fn lines(&self) -> &[SharedLine] {
        &self.lines
    }

    /// Point the store slot at `index` to `line`
    ///
    /// Returns false when the index is out of range; the store is unchanged.
    pub fn replace_at(&mut self, index: usize, line: SharedLine) -> bool {
        match self.lines.get_mut(index) {
            Some(slot) => {
                *slot = line;
                true
            }
            None => false,
        }
    }

    /// Write the text a user left in an edited line back into the store
    pub fn apply_edit(&mut self, edit: &EditData) -> bool {
        let Some(line) = self.get(edit.line_index) else {
            return false;
        };
        let mut line = line.lock();
        if line.id != edit.line.id {
            return false;
        }
        line.text = edit.new_text.clone();
        true
    }

    pub fn set_milestone(&mut self, id: LineId, label: impl Into<String>) {
        self.milestones.insert(id, label.into());
    }

    pub fn milestone(&self, id: &LineId) -> Option<&str> {
        self.milestones.get(id).map(String::as_str)
    }

    /// Source text of the given lines in document order, one per row
    pub fn selected_text<'a>(&self, ids: impl IntoIterator<Item = &'a LineId>) -> String {
        let wanted: Vec<&LineId> = ids.into_iter().collect();
        self.lines
            .iter()
            .filter_map(|line| {
                let line = line.lock();
                wanted
                    .contains(&&line.id)
                    .then(|| line.text.trim_end_matches(&['\r', '\n'][..]).to_string())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
