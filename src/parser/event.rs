//! Event capture
//!
//! Turns decoder event markers into [`Event`] records tied to the sample that
//! was active when the marker arrived.

use tracing::debug;

use crate::decoder::EventMarker;
use crate::parser::store::{RecordStore, EVENT_INITIAL_CAPACITY};
use crate::types::Event;
use crate::Result;

pub struct EventExtractor {
    events: RecordStore<Event>,
}

impl EventExtractor {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            events: RecordStore::new("events", EVENT_INITIAL_CAPACITY, limit),
        }
    }

    /// Record one marker seen while the sample at `sample_time` was active
    ///
    /// The event time is the sample time plus the marker's own offset.
    pub fn capture(&mut self, sample_time: u32, marker: EventMarker) -> Result<()> {
        let event = Event {
            time: sample_time.saturating_add(marker.time),
            event_type: marker.kind.tag().to_string(),
            name: marker.name,
        };
        debug!(
            "event {} at {}s (flags {:#x}, value {})",
            event.event_type, event.time, marker.flags, marker.value
        );
        self.events.push(event)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn growths(&self) -> usize {
        self.events.growths()
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events.into_vec()
    }
}
