use crate::types::{DiveMetadata, Event, Sample};

/// Counters gathered while replaying the value stream
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconstructStats {
    pub total_values: u64,
    /// Values that arrived before the first time marker
    pub dropped_values: u64,
    /// Value kinds the reconstruction does not use
    pub ignored_values: u64,
    pub sample_growths: usize,
    pub event_growths: usize,
}

/// Complete reconstructed dive
#[derive(Debug, Clone)]
pub struct DiveLog {
    pub meta: DiveMetadata,
    pub samples: Vec<Sample>,
    pub events: Vec<Event>,
    pub stats: ReconstructStats,
}

impl DiveLog {
    /// Time of the last sample in seconds
    pub fn sample_span_seconds(&self) -> u32 {
        self.samples.last().map(|s| s.time).unwrap_or(0)
    }

    /// Deepest depth seen across all samples
    pub fn max_depth(&self) -> f64 {
        self.samples.iter().map(|s| s.depth).fold(0.0, f64::max)
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }
}
