use std::collections::btree_map;
use std::iter::FusedIterator;

use drdf_types::{EventId, Image, RunId, SourceId};

use crate::run::{Event, Run};

/// One image together with the key that locates it in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageEntry<'a> {
    pub run: &'a RunId,
    pub event: EventId,
    pub source: &'a str,
    pub image: &'a Image,
}

/// Flattened iterator over every image of a store, in store order.
///
/// Runs without events and events without images yield nothing. Created by
/// [`DrdfStore::images`](crate::DrdfStore::images); calling that again
/// restarts the traversal.
#[derive(Clone, Debug)]
pub struct Images<'a> {
    runs: btree_map::Iter<'a, RunId, Run>,
    events: Option<(&'a RunId, btree_map::Iter<'a, EventId, Event>)>,
    images: Option<(&'a RunId, EventId, btree_map::Iter<'a, SourceId, Image>)>,
}

impl<'a> Images<'a> {
    pub(crate) fn new(runs: btree_map::Iter<'a, RunId, Run>) -> Self {
        Self {
            runs,
            events: None,
            images: None,
        }
    }
}

impl<'a> Iterator for Images<'a> {
    type Item = ImageEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((run, event, images)) = self.images.as_mut() {
                if let Some((source, image)) = images.next() {
                    return Some(ImageEntry {
                        run: *run,
                        event: *event,
                        source: source.as_str(),
                        image,
                    });
                }
                self.images = None;
            }

            if let Some((run, events)) = self.events.as_mut() {
                if let Some((event_id, event)) = events.next() {
                    self.images = Some((*run, *event_id, event.images.iter()));
                    continue;
                }
                self.events = None;
            }

            let (run_id, run) = self.runs.next()?;
            self.events = Some((run_id, run.events.iter()));
        }
    }
}

impl FusedIterator for Images<'_> {}
