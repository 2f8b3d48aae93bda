#![forbid(unsafe_code)]

//! Versioned snapshot history for an editable record collection.
//!
//! This module provides [`EditHistory`], the stateful controller behind an
//! editable grid or table: a bounded sequence of [`Frame`]s with a cursor,
//! plus a remembered baseline for dirty tracking. It supports:
//!
//! - **Deduplication**: commits whose normalized snapshot equals the cursor
//!   frame's snapshot update the working value without recording a frame
//! - **Redo-tail invalidation**: a commit after an undo discards every frame
//!   past the cursor
//! - **Capacity eviction**: oldest frames evicted beyond the configured limit
//! - **Baseline comparison**: a dirty flag computed against a baseline that
//!   undo/redo never touch
//!
//! # Invariants
//!
//! 1. `frames.len() >= 1` (there is always a current frame)
//! 2. `cursor < frames.len()` (after any operation)
//! 3. `frames.len() <= limit` (after any operation)
//! 4. Frames past the cursor are discarded whenever a new frame is recorded
//! 5. The baseline changes only through `reset`, `reset_to`, `set_initial`,
//!    and construction
//!
//! # Architecture
//!
//! ```text
//! commit(C)                       (from cursor at B)
//! ┌────────────────────────────────────────────────┐
//! │ Frames:  [A, B, C]                             │
//! │ Cursor:         ▲                              │
//! └────────────────────────────────────────────────┘
//!
//! undo() x1
//! ┌────────────────────────────────────────────────┐
//! │ Frames:  [A, B, C]    C is the redo tail       │
//! │ Cursor:      ▲                                 │
//! └────────────────────────────────────────────────┘
//!
//! commit(D) — truncates the redo tail, C is gone
//! ┌────────────────────────────────────────────────┐
//! │ Frames:  [A, B, D]                             │
//! │ Cursor:         ▲                              │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! # Memory Model
//!
//! Frames are stored in a `VecDeque` for O(1) eviction from the front. Each
//! frame shares its record collection as an `Arc<Vec<T>>`, so recording a
//! frame never clones records; a frame costs one `Arc` plus its precomputed
//! [`Snapshot`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::snapshot::{self, Snapshot};

/// Strategy mapping a record collection to its comparable snapshot.
pub type NormalizeFn<T> = Box<dyn Fn(&[T]) -> Snapshot + Send + Sync>;

/// Strategy deciding whether two snapshots are semantically equal.
pub type CompareFn = Box<dyn Fn(&Snapshot, &Snapshot) -> bool + Send + Sync>;

/// Default number of frames retained.
pub const DEFAULT_LIMIT: usize = 50;

/// Configuration for an [`EditHistory`]: frame capacity plus the injected
/// normalization and comparison strategies.
///
/// Strategies must be pure and total. The defaults serialize collections to
/// JSON trees and compare them structurally, degrading to reference identity
/// for collections that cannot be serialized (see [`crate::snapshot`]).
pub struct HistoryConfig<T> {
    limit: usize,
    normalize: NormalizeFn<T>,
    compare: CompareFn,
}

impl<T: Serialize + 'static> Default for HistoryConfig<T> {
    fn default() -> Self {
        Self::structural()
    }
}

impl<T: Serialize + 'static> HistoryConfig<T> {
    /// Configuration using the default structural strategies.
    #[must_use]
    pub fn structural() -> Self {
        Self::custom(|records: &[T]| snapshot::structural(records))
    }

    /// Effectively unbounded capacity (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self::structural().with_limit(usize::MAX)
    }
}

impl<T> HistoryConfig<T> {
    /// Configuration with a caller-supplied normalization strategy and the
    /// default comparison. This is the entry point for record types without
    /// a `Serialize` implementation.
    #[must_use]
    pub fn custom(normalize: impl Fn(&[T]) -> Snapshot + Send + Sync + 'static) -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            normalize: Box::new(normalize),
            compare: Box::new(snapshot::structural_eq),
        }
    }

    /// Set the frame capacity. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Replace the normalization strategy.
    #[must_use]
    pub fn with_normalize(
        mut self,
        normalize: impl Fn(&[T]) -> Snapshot + Send + Sync + 'static,
    ) -> Self {
        self.normalize = Box::new(normalize);
        self
    }

    /// Replace the comparison strategy.
    #[must_use]
    pub fn with_compare(
        mut self,
        compare: impl Fn(&Snapshot, &Snapshot) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.compare = Box::new(compare);
        self
    }

    /// The configured frame capacity.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl<T> fmt::Debug for HistoryConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryConfig")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

/// An immutable point in history: the raw record collection plus its
/// precomputed normalized snapshot.
pub struct Frame<T> {
    raw: Arc<Vec<T>>,
    snapshot: Snapshot,
}

impl<T> Frame<T> {
    fn new(raw: Arc<Vec<T>>, snapshot: Snapshot) -> Self {
        Self { raw, snapshot }
    }

    /// The recorded record collection.
    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.raw
    }

    /// The precomputed normalized snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

// Manual impl: sharing the Arc must not require `T: Clone`.
impl<T> Clone for Frame<T> {
    fn clone(&self) -> Self {
        Self {
            raw: Arc::clone(&self.raw),
            snapshot: self.snapshot.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Frame<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("records", &self.raw.len())
            .field("snapshot", &self.snapshot)
            .finish()
    }
}

/// Read-only view of the engine's observable state, bundled for adapters
/// that re-derive their UI state in one shot.
#[derive(Debug)]
pub struct HistoryState<T> {
    /// The cached working collection, including non-semantic changes from
    /// deduplicated commits.
    pub working_value: Arc<Vec<T>>,
    /// Whether the working value differs semantically from the baseline.
    pub is_dirty: bool,
    /// Whether an undo step is available.
    pub can_undo: bool,
    /// Whether a redo step is available.
    pub can_redo: bool,
    /// Number of frames currently retained.
    pub history_len: usize,
    /// Index of the active frame.
    pub index: usize,
}

impl<T> Clone for HistoryState<T> {
    fn clone(&self) -> Self {
        Self {
            working_value: Arc::clone(&self.working_value),
            is_dirty: self.is_dirty,
            can_undo: self.can_undo,
            can_redo: self.can_redo,
            history_len: self.history_len,
            index: self.index,
        }
    }
}

/// Bounded undo/redo history over an editable record collection, with
/// deduplication and baseline dirty tracking.
///
/// The engine owns the working value, an ordered sequence of [`Frame`]s, a
/// cursor into that sequence, and a baseline frame. All operations take
/// `&mut self` and complete atomically from the caller's perspective; the
/// engine performs no I/O and never fails.
///
/// # Invariants
///
/// 1. `history_len() >= 1`: there is always a current frame.
/// 2. `index() < history_len()` after any operation.
/// 3. `history_len() <= config.limit()` after any operation.
/// 4. `undo`/`redo` never change the set of frames or the baseline.
pub struct EditHistory<T> {
    /// Cached working collection. Equals the cursor frame's records except
    /// after a deduplicated commit, which replaces the cache only.
    working: Arc<Vec<T>>,
    /// Recorded frames, oldest at the front.
    frames: VecDeque<Frame<T>>,
    /// Index of the active frame.
    cursor: usize,
    /// Dirty-comparison target; also the re-anchor value for `reset`.
    baseline: Frame<T>,
    config: HistoryConfig<T>,
}

impl<T: Serialize + 'static> EditHistory<T> {
    /// Create an engine over `initial` with the default configuration.
    #[must_use]
    pub fn new(initial: Vec<T>) -> Self {
        Self::with_config(initial, HistoryConfig::default())
    }
}

impl<T> EditHistory<T> {
    /// Create an engine over `initial` with the given configuration.
    ///
    /// The initial collection becomes both the first frame and the baseline.
    #[must_use]
    pub fn with_config(initial: Vec<T>, config: HistoryConfig<T>) -> Self {
        let snapshot = (config.normalize)(&initial);
        let raw = Arc::new(initial);
        let baseline = Frame::new(Arc::clone(&raw), snapshot.clone());
        let mut frames = VecDeque::new();
        frames.push_back(Frame::new(Arc::clone(&raw), snapshot));
        Self {
            working: raw,
            frames,
            cursor: 0,
            baseline,
            config,
        }
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Commit a full replacement collection.
    ///
    /// If the collection's snapshot equals the cursor frame's snapshot, only
    /// the working value is replaced; history and cursor are untouched, so
    /// non-semantic changes never pollute the undo stack. Otherwise any redo
    /// tail is discarded, a new frame is recorded at the cursor, and the
    /// oldest frames are evicted down to the configured limit.
    pub fn commit(&mut self, next: Vec<T>) {
        self.commit_arc(Arc::new(next));
    }

    /// Commit a pre-shared collection.
    ///
    /// Use this when you already have an `Arc<Vec<T>>` and want to avoid
    /// double-wrapping.
    pub fn commit_arc(&mut self, next: Arc<Vec<T>>) {
        let snapshot = (self.config.normalize)(next.as_slice());
        if (self.config.compare)(&snapshot, &self.frames[self.cursor].snapshot) {
            trace!(index = self.cursor, "commit deduplicated");
            self.working = next;
            return;
        }

        self.frames.truncate(self.cursor + 1);
        self.frames.push_back(Frame::new(Arc::clone(&next), snapshot));
        self.cursor = self.frames.len() - 1;
        self.enforce_limit();
        self.working = next;
        trace!(
            index = self.cursor,
            len = self.frames.len(),
            "commit recorded"
        );
    }

    /// Step the cursor back one frame and return the restored collection.
    ///
    /// No-op returning `None` when the cursor is already at the oldest
    /// retained frame.
    pub fn undo(&mut self) -> Option<Arc<Vec<T>>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.working = Arc::clone(&self.frames[self.cursor].raw);
        trace!(index = self.cursor, "undo");
        Some(Arc::clone(&self.working))
    }

    /// Step the cursor forward one frame and return the restored collection.
    ///
    /// No-op returning `None` when there is no redo tail.
    pub fn redo(&mut self) -> Option<Arc<Vec<T>>> {
        if self.cursor + 1 >= self.frames.len() {
            return None;
        }
        self.cursor += 1;
        self.working = Arc::clone(&self.frames[self.cursor].raw);
        trace!(index = self.cursor, "redo");
        Some(Arc::clone(&self.working))
    }

    /// Re-anchor on the remembered baseline collection.
    ///
    /// Discards all history and restores the working value to the baseline
    /// (the collection last passed to [`reset_to`](Self::reset_to),
    /// [`set_initial`](Self::set_initial), or the constructor).
    pub fn reset(&mut self) {
        let baseline = self.baseline.clone();
        self.reanchor(baseline);
    }

    /// Re-anchor on a new collection.
    ///
    /// The collection becomes the baseline, the sole frame, and the working
    /// value. All prior history is discarded.
    pub fn reset_to(&mut self, next: Vec<T>) {
        let snapshot = (self.config.normalize)(&next);
        self.reanchor(Frame::new(Arc::new(next), snapshot));
    }

    /// Replace the baseline without touching history, cursor, or working
    /// value.
    ///
    /// Silently moves the dirty-comparison target (typically after an
    /// external save) while keeping the undo stack intact. A subsequent
    /// [`reset`](Self::reset) re-anchors on this collection.
    pub fn set_initial(&mut self, next: Vec<T>) {
        let snapshot = (self.config.normalize)(&next);
        self.baseline = Frame::new(Arc::new(next), snapshot);
        debug!("baseline replaced");
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// The active frame's records, the canonical current value.
    ///
    /// Always equals the working value except after a deduplicated commit,
    /// where the working value holds the newer, semantically-equal
    /// collection.
    #[must_use]
    pub fn value(&self) -> &[T] {
        self.frames[self.cursor].records()
    }

    /// The cached working collection.
    #[must_use]
    pub fn working_value(&self) -> &Arc<Vec<T>> {
        &self.working
    }

    /// Whether the working value differs semantically from the baseline.
    ///
    /// Recomputed on every call from the current working value.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        let snapshot = (self.config.normalize)(self.working.as_slice());
        !(self.config.compare)(&snapshot, &self.baseline.snapshot)
    }

    /// Whether an undo step is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a redo step is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.frames.len()
    }

    /// Number of frames currently retained.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.frames.len()
    }

    /// Index of the active frame.
    #[must_use]
    pub fn index(&self) -> usize {
        self.cursor
    }

    /// Number of frames reachable via undo.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.cursor
    }

    /// Number of frames in the redo tail.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.frames.len() - 1 - self.cursor
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig<T> {
        &self.config
    }

    /// Bundle the observable state into one read-only snapshot.
    #[must_use]
    pub fn state(&self) -> HistoryState<T> {
        HistoryState {
            working_value: Arc::clone(&self.working),
            is_dirty: self.is_dirty(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            history_len: self.frames.len(),
            index: self.cursor,
        }
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Replace all state with a single frame that is also the baseline.
    fn reanchor(&mut self, frame: Frame<T>) {
        self.working = Arc::clone(&frame.raw);
        self.baseline = frame.clone();
        self.frames.clear();
        self.frames.push_back(frame);
        self.cursor = 0;
        debug!("history re-anchored");
    }

    /// Evict oldest frames beyond the capacity, keeping the cursor on the
    /// same logical frame.
    fn enforce_limit(&mut self) {
        while self.frames.len() > self.config.limit {
            self.frames.pop_front();
            self.cursor = self.cursor.saturating_sub(1);
            trace!(len = self.frames.len(), "frame evicted");
        }
    }
}

impl<T> fmt::Debug for EditHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditHistory")
            .field("history_len", &self.frames.len())
            .field("index", &self.cursor)
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
