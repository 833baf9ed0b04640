//! One rendered transcript line and its interaction state
//!
//! A `LineComponent` wraps a shared `LineItem` with the transient state the
//! viewer needs for it: selection, inline editing, hover and the translate
//! control. Its state machine:
//!
//! ```text
//!            double + modifier           double (no modifier)
//!   Idle  ◀────────────────────▶ Selected ───────────────────▶ Editing
//!    ▲                                                            │
//!    └──────────────── pointer-down outside the text ────────────┘
//! ```
//!
//! Every transition is reported upward as a `LineEvent`.

mod component;
mod context;
mod edit;
mod events;
mod region;
mod render;

pub use component::LineComponent;
pub use context::{LineContext, OutsideClickListeners};
pub use edit::EditBuffer;
pub use events::{EditData, LineEvent};
pub use region::TextRange;
pub use render::{display_text, RenderedLine};
