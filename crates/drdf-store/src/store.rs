use std::collections::btree_map::{self, BTreeMap};

use drdf_types::{EventId, Image, RunId, SourceId};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::iter::Images;
use crate::run::{Event, Run};

/// In-memory run → event → image hierarchy.
///
/// Keys are kept sorted (run id, event number, source id), which is also
/// the order a writer emits them in. A store is either populated
/// incrementally through the cursor API (`start_run`, `start_event`,
/// `add_image`, ...) or assembled directly through [`DrdfStore::run_entry`]
/// by a decoder. Nothing is ever removed.
#[derive(Clone, Debug, Default)]
pub struct DrdfStore {
    runs: BTreeMap<RunId, Run>,
    current_run: Option<RunId>,
    current_event: Option<EventId>,
}

impl DrdfStore {
    /// Create a new empty store with no current run.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Cursor API
    // -----------------------------------------------------------------------

    /// Make `id` the current run, creating it if absent. Clears the current event.
    pub fn start_run(&mut self, id: RunId) {
        if !self.runs.contains_key(&id) {
            debug!(run = %id, "run started");
        }
        self.runs.entry(id).or_default();
        self.current_run = Some(id);
        self.current_event = None;
    }

    /// Set the georef of the current run.
    pub fn set_georef(&mut self, georef: impl Into<String>) -> StoreResult<()> {
        self.current_run_mut("set_georef")?.set_georef(georef);
        Ok(())
    }

    /// Make `id` the current event of the current run, creating it if absent.
    pub fn start_event(&mut self, id: EventId) -> StoreResult<()> {
        self.current_run_mut("start_event")?.event_entry(id);
        self.current_event = Some(id);
        Ok(())
    }

    /// Store a deep copy of `image` under `source` in the current event.
    pub fn add_image(&mut self, source: impl Into<SourceId>, image: &Image) -> StoreResult<()> {
        self.current_event_mut("add_image")?
            .insert(source, image.clone());
        Ok(())
    }

    /// Move `image` into the current event under `source`.
    ///
    /// On success `image` is left empty. On failure it is untouched.
    pub fn move_image(&mut self, source: impl Into<SourceId>, image: &mut Image) -> StoreResult<()> {
        self.current_event_mut("move_image")?
            .insert(source, image.take());
        Ok(())
    }

    pub fn current_run(&self) -> Option<RunId> {
        self.current_run
    }

    pub fn current_event(&self) -> Option<EventId> {
        self.current_event
    }

    fn current_run_mut(&mut self, operation: &'static str) -> StoreResult<&mut Run> {
        self.current_run
            .and_then(|id| self.runs.get_mut(&id))
            .ok_or(StoreError::NoCurrentRun { operation })
    }

    fn current_event_mut(&mut self, operation: &'static str) -> StoreResult<&mut Event> {
        let event = self.current_event;
        let run = self.current_run_mut(operation)?;
        event
            .and_then(|id| run.events.get_mut(&id))
            .ok_or(StoreError::NoCurrentEvent { operation })
    }

    // -----------------------------------------------------------------------
    // Direct construction
    // -----------------------------------------------------------------------

    /// The run with this id, created empty if absent. Leaves the cursor alone.
    pub fn run_entry(&mut self, id: RunId) -> &mut Run {
        self.runs.entry(id).or_default()
    }

    /// Fold `other` into this store.
    ///
    /// Runs with the same id are merged event by event; images overwrite by
    /// source id; a non-empty incoming georef replaces the existing one.
    /// The cursor is left unchanged.
    pub fn merge(&mut self, other: DrdfStore) {
        for (id, run) in other.runs {
            let target = self.runs.entry(id).or_default();
            if !run.georef.is_empty() {
                target.georef = run.georef;
            }
            for (event_id, event) in run.events {
                let target_event = target.events.entry(event_id).or_default();
                target_event.images.extend(event.images);
            }
            debug!(run = %id, "run merged");
        }
    }

    // -----------------------------------------------------------------------
    // Lookup and traversal
    // -----------------------------------------------------------------------

    pub fn run(&self, id: &RunId) -> Option<&Run> {
        self.runs.get(id)
    }

    pub fn contains_run(&self, id: &RunId) -> bool {
        self.runs.contains_key(id)
    }

    /// Resolve (run, event, source) to an image.
    pub fn find(&self, run: &RunId, event: EventId, source: &str) -> Option<&Image> {
        self.runs.get(run)?.event(event)?.get(source)
    }

    /// Runs in id order.
    pub fn runs(&self) -> btree_map::Iter<'_, RunId, Run> {
        self.runs.iter()
    }

    /// Every image in store order, with its full key.
    pub fn images(&self) -> Images<'_> {
        Images::new(self.runs.iter())
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn event_count(&self) -> usize {
        self.runs.values().map(Run::len).sum()
    }

    pub fn image_count(&self) -> usize {
        self.runs.values().map(Run::image_count).sum()
    }
}

/// Stores compare by content; the cursor is construction state only.
impl PartialEq for DrdfStore {
    fn eq(&self, other: &Self) -> bool {
        self.runs == other.runs
    }
}

impl Eq for DrdfStore {}
