//! Terminal interaction: single-key input and the in-place reorderable table.

pub mod keys;
pub mod reorder;

pub use keys::{CrosstermKeys, KeySource, ListKey, RawModeGuard};
pub use reorder::{Highlight, ReorderableList, TableRow};
