//! Events a line component reports to the viewer hosting it

use crate::document::{LineId, LineItem};

/// What the user left behind when leaving edit mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditData {
    /// Text captured when editing began
    pub original_text: String,
    /// Edit buffer contents at the moment of exit
    pub new_text: String,
    /// Store position recorded on the line
    pub line_index: usize,
    /// Snapshot of the line at exit
    pub line: LineItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    Selected(LineId),
    Deselected(LineId),
    /// `in_edit: true` when editing starts. An exit carries `data`; a teardown
    /// signal does not, whether or not the line was being edited.
    Edit {
        in_edit: bool,
        data: Option<EditData>,
    },
}

impl LineEvent {
    pub fn edit_begin() -> Self {
        Self::Edit {
            in_edit: true,
            data: None,
        }
    }

    pub fn edit_end(data: Option<EditData>) -> Self {
        Self::Edit {
            in_edit: false,
            data,
        }
    }
}
