//! Run/event/image hierarchy for the Detector Response Data Format.
//!
//! A [`DrdfStore`] maps run ids to [`Run`]s, each run maps event numbers to
//! [`Event`]s, and each event maps source ids to images. All three levels
//! are ordered maps, so traversal order (and therefore the byte order a
//! writer produces) is fully determined by the keys.
//!
//! # Building a store
//!
//! The cursor API mirrors how acquisition code produces data:
//!
//! 1. `start_run(id)` selects (or creates) a run and clears the current event.
//! 2. `set_georef(uri)` labels the current run.
//! 3. `start_event(n)` selects (or creates) an event in the current run.
//! 4. `add_image` / `move_image` store an image in the current event.
//!
//! Calling 2–4 without the run or event they need returns a [`StoreError`],
//! which is kept separate from decoding errors: it always means the caller
//! issued operations in the wrong order.
//!
//! # Design Rules
//!
//! 1. The store is append-only; there are no removal operations.
//! 2. Every image is owned by exactly one event, every event by one run.
//! 3. Decoders bypass the cursor and assemble runs through `run_entry`.

pub mod error;
pub mod iter;
pub mod run;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use iter::{ImageEntry, Images};
pub use run::{Event, Run};
pub use store::DrdfStore;
