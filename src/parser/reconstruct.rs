//! Sample reconstruction from the decoded value stream
//!
//! A time marker opens a new sample; every other value updates the sample that
//! was opened last. A new sample starts at the last depth seen anywhere in the
//! stream, since a depth update may arrive after its time marker.

use tracing::trace;

use crate::decoder::SampleValue;
use crate::parser::event::EventExtractor;
use crate::parser::store::{RecordStore, StoreLimits, SAMPLE_INITIAL_CAPACITY};
use crate::types::{Event, ReconstructStats, Sample};
use crate::Result;

/// Reconstruction state threaded through one decode pass
pub struct SampleReconstructor {
    samples: RecordStore<Sample>,
    events: EventExtractor,
    current_depth: f64,
    stats: ReconstructStats,
}

impl SampleReconstructor {
    pub fn new(limits: &StoreLimits) -> Self {
        Self {
            samples: RecordStore::new("samples", SAMPLE_INITIAL_CAPACITY, limits.max_samples),
            events: EventExtractor::new(limits.max_events),
            current_depth: 0.0,
            stats: ReconstructStats::default(),
        }
    }

    /// Process exactly one decoded value
    ///
    /// # Errors
    ///
    /// Returns [`crate::DiveError::Allocation`] when the sample or event store
    /// cannot grow.
    pub fn ingest(&mut self, value: SampleValue) -> Result<()> {
        self.stats.total_values += 1;

        match value {
            SampleValue::Time(ms) => {
                self.samples.push(Sample::new(ms / 1000, self.current_depth))?;
            }
            SampleValue::Depth(depth) => {
                if let Some(sample) = active_sample(&mut self.samples, &mut self.stats, "depth") {
                    sample.depth = depth;
                    self.current_depth = depth;
                }
            }
            SampleValue::Temperature(temperature) => {
                if let Some(sample) =
                    active_sample(&mut self.samples, &mut self.stats, "temperature")
                {
                    sample.temperature = Some(temperature);
                }
            }
            SampleValue::Ppo2(ppo2) => {
                if let Some(sample) = active_sample(&mut self.samples, &mut self.stats, "ppo2") {
                    sample.ppo2 = Some(ppo2);
                }
            }
            SampleValue::Event(marker) => {
                if let Some(sample) = active_sample(&mut self.samples, &mut self.stats, "event") {
                    let time = sample.time;
                    self.events.capture(time, marker)?;
                }
            }
            SampleValue::Pressure { .. }
            | SampleValue::Heading(_)
            | SampleValue::Cns(_)
            | SampleValue::Setpoint(_)
            | SampleValue::Unrecognized(_) => {
                if active_sample(&mut self.samples, &mut self.stats, "unmodelled").is_some() {
                    self.stats.ignored_values += 1;
                }
            }
        }
        Ok(())
    }

    /// Depth that the next sample will start from
    pub fn current_depth(&self) -> f64 {
        self.current_depth
    }

    pub fn samples(&self) -> &[Sample] {
        self.samples.as_slice()
    }

    /// End the pass and hand over the accumulated records
    pub fn finish(self) -> (Vec<Sample>, Vec<Event>, ReconstructStats) {
        let mut stats = self.stats;
        stats.sample_growths = self.samples.growths();
        stats.event_growths = self.events.growths();
        (self.samples.into_vec(), self.events.into_events(), stats)
    }
}

/// Sample opened by the most recent time marker
///
/// Counts the value as dropped when no time marker has been seen yet.
fn active_sample<'a>(
    samples: &'a mut RecordStore<Sample>,
    stats: &mut ReconstructStats,
    kind: &str,
) -> Option<&'a mut Sample> {
    let sample = samples.last_mut();
    if sample.is_none() {
        trace!("dropping {kind} value received before the first time marker");
        stats.dropped_values += 1;
    }
    sample
}
