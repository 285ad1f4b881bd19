//! In-memory, time-ordered sequence of slices.

use chrono::NaiveDateTime;

use currents_common::time::abs_diff_millis;
use currents_common::TimeSlice;

/// Time slices ordered by timestamp (non-decreasing).
#[derive(Debug, Clone, Default)]
pub struct Series {
    slices: Vec<TimeSlice>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append slices and re-sort the whole series by timestamp.
    ///
    /// The sort is stable, so slices with equal timestamps keep arrival order.
    /// Returns the new length.
    pub fn merge(&mut self, slices: Vec<TimeSlice>) -> usize {
        if slices.is_empty() {
            return self.slices.len();
        }
        self.slices.extend(slices);
        self.slices.sort_by_key(|s| s.timestamp);
        metrics::gauge!("series_slices").set(self.slices.len() as f64);
        self.slices.len()
    }

    /// Index of the slice nearest to `target`; ties go to the earliest index.
    pub fn closest_index(&self, target: NaiveDateTime) -> Option<usize> {
        let mut best: Option<(usize, i64)> = None;
        for (i, slice) in self.slices.iter().enumerate() {
            let diff = abs_diff_millis(slice.timestamp, target);
            if best.map_or(true, |(_, min)| diff < min) {
                best = Some((i, diff));
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn get(&self, index: usize) -> Option<&TimeSlice> {
        self.slices.get(index)
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeSlice> {
        self.slices.iter()
    }

    /// True when timestamps never decrease.
    pub fn is_sorted(&self) -> bool {
        self.slices
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    }
}
