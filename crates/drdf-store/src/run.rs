use std::collections::btree_map::{self, BTreeMap};

use drdf_types::{EventId, Image, SourceId};

/// All images recorded for one trigger, keyed by source id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Event {
    pub(crate) images: BTreeMap<SourceId, Image>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an image, returning the one previously stored under `source`.
    pub fn insert(&mut self, source: impl Into<SourceId>, image: Image) -> Option<Image> {
        self.images.insert(source.into(), image)
    }

    pub fn get(&self, source: &str) -> Option<&Image> {
        self.images.get(source)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.images.contains_key(source)
    }

    /// Images in source-id order.
    pub fn images(&self) -> btree_map::Iter<'_, SourceId, Image> {
        self.images.iter()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Total amplitude over every image of the event.
    pub fn amplitude_sum(&self) -> f64 {
        self.images.values().map(Image::amplitude_sum).sum()
    }
}

/// A run: a georef plus its events in event-number order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Run {
    pub(crate) georef: String,
    pub(crate) events: BTreeMap<EventId, Event>,
}

impl Run {
    pub fn new() -> Self {
        Self::default()
    }

    /// URI of the geometry/configuration this run was produced with.
    pub fn georef(&self) -> &str {
        &self.georef
    }

    pub fn set_georef(&mut self, georef: impl Into<String>) {
        self.georef = georef.into();
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    pub fn contains_event(&self, id: EventId) -> bool {
        self.events.contains_key(&id)
    }

    /// The event with this id, created empty if absent.
    pub fn event_entry(&mut self, id: EventId) -> &mut Event {
        self.events.entry(id).or_default()
    }

    /// Events in event-number order.
    pub fn events(&self) -> btree_map::Iter<'_, EventId, Event> {
        self.events.iter()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn image_count(&self) -> usize {
        self.events.values().map(Event::len).sum()
    }
}
