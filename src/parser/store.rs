//! Append-only record storage with capacity doubling

use crate::error::DiveError;
use crate::Result;

/// Initial capacity of the sample store
pub const SAMPLE_INITIAL_CAPACITY: usize = 128;
/// Initial capacity of the event store; events are far rarer than samples
pub const EVENT_INITIAL_CAPACITY: usize = 16;

/// Optional ceilings on the number of records a run may hold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreLimits {
    pub max_samples: Option<usize>,
    pub max_events: Option<usize>,
}

/// Growable, append-only sequence of records
///
/// Capacity starts at `initial_capacity` on the first push and doubles every
/// time it runs out. A failed growth, or growth past the configured ceiling,
/// is reported as [`DiveError::Allocation`] and leaves the store untouched.
#[derive(Debug)]
pub struct RecordStore<T> {
    name: &'static str,
    records: Vec<T>,
    initial_capacity: usize,
    limit: Option<usize>,
    growths: usize,
}

impl<T> RecordStore<T> {
    pub fn new(name: &'static str, initial_capacity: usize, limit: Option<usize>) -> Self {
        Self {
            name,
            records: Vec::new(),
            initial_capacity: initial_capacity.max(1),
            limit,
            growths: 0,
        }
    }

    /// Append a record and return a handle to it
    ///
    /// # Errors
    ///
    /// Returns [`DiveError::Allocation`] when the store cannot grow.
    pub fn push(&mut self, record: T) -> Result<&mut T> {
        if let Some(max) = self.limit {
            if self.records.len() >= max {
                return Err(DiveError::Allocation {
                    store: self.name,
                    reason: format!("ceiling of {max} records reached"),
                });
            }
        }

        if self.records.len() == self.capacity() {
            self.grow()?;
        }

        let index = self.records.len();
        self.records.push(record);
        Ok(&mut self.records[index])
    }

    fn grow(&mut self) -> Result<()> {
        let capacity = self.capacity();
        let target = if capacity == 0 {
            self.initial_capacity
        } else {
            capacity.checked_mul(2).ok_or_else(|| DiveError::Allocation {
                store: self.name,
                reason: "capacity overflow".to_string(),
            })?
        };

        self.records
            .try_reserve_exact(target - self.records.len())
            .map_err(|e| DiveError::Allocation {
                store: self.name,
                reason: e.to_string(),
            })?;
        self.growths += 1;
        Ok(())
    }

    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.records.last_mut()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }

    /// Number of reallocations performed so far
    pub fn growths(&self) -> usize {
        self.growths
    }

    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    pub fn into_vec(self) -> Vec<T> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut store = RecordStore::new("numbers", 4, None);
        for i in 0..10 {
            store.push(i).unwrap();
        }
        assert_eq!(store.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(store.as_slice().last(), Some(&9));
    }

    #[test]
    fn test_capacity_doubles() {
        let mut store = RecordStore::new("samples", SAMPLE_INITIAL_CAPACITY, None);
        assert_eq!(store.capacity(), 0);

        store.push(0u32).unwrap();
        assert_eq!(store.capacity(), 128);
        assert_eq!(store.growths(), 1);

        for i in 1..=128 {
            store.push(i).unwrap();
        }
        assert_eq!(store.capacity(), 256);
        assert_eq!(store.growths(), 2);
    }

    #[test]
    fn test_growths_are_logarithmic() {
        let mut store = RecordStore::new("events", EVENT_INITIAL_CAPACITY, None);
        let appends = 100_000usize;
        for i in 0..appends {
            store.push(i).unwrap();
        }
        assert_eq!(store.len(), appends);
        // 16, 32, ..., 131072
        assert_eq!(store.growths(), 14);
        let bound = (appends as f64).log2().ceil() as usize;
        assert!(store.growths() <= bound);
    }

    #[test]
    fn test_ceiling_rejects_129th_push() {
        let mut store = RecordStore::new("samples", SAMPLE_INITIAL_CAPACITY, Some(128));
        for i in 0..128u32 {
            store.push(i).unwrap();
        }

        let err = store.push(128).unwrap_err();
        assert!(matches!(err, DiveError::Allocation { store: "samples", .. }));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(store.len(), 128);
    }

    #[test]
    fn test_push_returns_written_record() {
        let mut store = RecordStore::new("strings", 1, None);
        store.push(String::from("a")).unwrap().push('b');
        store.push(String::from("c")).unwrap();
        assert_eq!(store.into_vec(), vec!["ab".to_string(), "c".to_string()]);
    }
}
