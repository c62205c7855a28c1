//! Headless form building blocks for the catalog editor.
//!
//! Field definitions are plain data, rendered fields are small state machines
//! driven by the host's events, and views are virtual-DOM trees.

pub mod access;
pub mod autocomplete;
pub mod definition;
pub mod field;
pub mod form;
pub mod node;
pub mod viewport;

pub use access::{FieldAccess, FormModel, SharedModel};
pub use autocomplete::{
    Autocomplete, InputBox, Key, KeyOutcome, KeyPress, MAX_SUGGESTIONS, Placement, rank,
};
pub use definition::{FieldDefinition, FieldKind};
pub use field::{Control, Field, INVALID_DEFINITION_MESSAGE, IconKind, render};
pub use form::{Form, render_form};
pub use node::{Element, Node};
pub use viewport::Viewport;
