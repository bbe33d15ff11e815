#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The queue and flow observed around one intersection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntersectionReading {
    /// The number of vehicles waiting near the intersection.
    pub queue: u32,
    /// The number of vehicles moving through the intersection.
    pub flow: u32,
}

/// A frozen measurement of the traffic at every intersection,
/// indexed by intersection ID.
///
/// Both counts are floored at one so that no reading is degenerate.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrafficSnapshot {
    readings: Vec<IntersectionReading>,
}

impl IntersectionReading {
    /// Creates a reading, flooring both counts at one.
    pub fn new(queue: u32, flow: u32) -> Self {
        Self {
            queue: queue.max(1),
            flow: flow.max(1),
        }
    }
}

impl TrafficSnapshot {
    /// Creates a snapshot from per-intersection readings.
    pub fn new(readings: impl IntoIterator<Item = IntersectionReading>) -> Self {
        Self {
            readings: readings
                .into_iter()
                .map(|r| IntersectionReading::new(r.queue, r.flow))
                .collect(),
        }
    }

    /// Creates a snapshot in which every intersection has the same reading.
    pub fn uniform(len: usize, queue: u32, flow: u32) -> Self {
        Self::new(std::iter::repeat(IntersectionReading::new(queue, flow)).take(len))
    }

    /// The readings, in intersection ID order.
    pub fn readings(&self) -> &[IntersectionReading] {
        &self.readings
    }

    /// Gets the reading for an intersection.
    pub fn get(&self, intersection: usize) -> Option<IntersectionReading> {
        self.readings.get(intersection).copied()
    }

    /// The number of intersections covered.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the snapshot covers no intersections.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// The total queue across all intersections.
    pub fn total_queue(&self) -> u32 {
        self.readings.iter().map(|r| r.queue).sum()
    }
}
