//! weft-core: an immediate-mode, declarative terminal UI engine.
//!
//! A frame's UI is described as a tree of lightweight declarative nodes,
//! compiled once into a flattened operation list, then rendered each
//! frame: a three-phase layout computes sizes and positions, a painter
//! writes cells into a character buffer, and the screen driver diffs
//! that buffer against the terminal's displayed state and emits the
//! minimum escape stream needed to reconcile them.

pub mod app;
pub mod border;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod error;
pub mod input;
pub mod layer;
mod layout;
pub mod node;
mod painter;
pub mod screen;
pub mod style;
pub mod template;
pub mod terminal;
pub mod value;

pub use app::{AppHandle, AppLoop, CrosstermEvents, EventSource, ScriptedEvents};
pub use border::Border;
pub use buffer::CharBuffer;
pub use cell::Cell;
pub use color::Color;
pub use error::{Result, WeftError};
pub use input::{Event, KeyCode, KeyEvent, KeyPattern, Modifiers, Router};
pub use layer::{CursorState, Layer};
pub use node::{
    FlexParams, Node, Span, condition, custom, for_each, hbox, layer_view, leader, leader_values,
    progress, progress_value, rich, rich_value, selection_list, switch, text, text_value, vbox,
    when,
};
pub use screen::ScreenDriver;
pub use style::{Align, Attributes, Case, Margin, Style};
pub use template::Template;
pub use terminal::{
    CrosstermBackend, CursorShape, Terminal, TestBackend, cursor_color_seq, cursor_shape_seq,
};
pub use value::Value;
