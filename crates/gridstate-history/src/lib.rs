#![forbid(unsafe_code)]

//! GridState History
//!
//! Bounded undo/redo history with dirty tracking for an editable record
//! collection, built to sit behind an editable grid or table UI.
//!
//! # Key Components
//!
//! - [`EditHistory`] - The history engine: commit, undo, redo, reset, and
//!   baseline management over a sequence of records
//! - [`HistoryConfig`] - Frame capacity plus injected normalization and
//!   comparison strategies
//! - [`Snapshot`] - Comparable representation of a collection, produced by a
//!   normalization strategy
//! - [`HistoryState`] - Bundled read-only view of the observable state
//!
//! # How it fits in a system
//!
//! The engine is a pure in-memory structure with no I/O and no failure
//! states. A UI adapter drives it: call [`EditHistory::commit`] whenever the
//! UI produces a new collection, surface undo/redo controls gated on
//! [`EditHistory::can_undo`]/[`EditHistory::can_redo`], and re-derive UI
//! state from [`EditHistory::state`] after every operation.
//!
//! ```
//! use gridstate_history::EditHistory;
//!
//! let mut history = EditHistory::new(vec!["alpha".to_string()]);
//! history.commit(vec!["alpha".into(), "beta".into()]);
//! assert!(history.is_dirty());
//!
//! history.undo();
//! assert_eq!(history.value(), ["alpha".to_string()]);
//! assert!(!history.is_dirty());
//! ```

pub mod engine;
pub mod snapshot;

pub use engine::{
    CompareFn, DEFAULT_LIMIT, EditHistory, Frame, HistoryConfig, HistoryState, NormalizeFn,
};
pub use snapshot::Snapshot;
