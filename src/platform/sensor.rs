//! Motion sensor input
//!
//! The driver itself lives outside the crate; anything that can hand back the
//! latest 3-axis reading implements [`AccelSensor`]. "No new data" is a normal
//! answer, not an error.

use std::collections::VecDeque;

use crate::sim::AccelSample;

pub trait AccelSensor {
    /// Latest reading in g, or `None` if nothing is available this tick.
    /// Must not block.
    fn poll(&mut self) -> Option<AccelSample>;
}

impl<F: FnMut() -> Option<AccelSample>> AccelSensor for F {
    fn poll(&mut self) -> Option<AccelSample> {
        self()
    }
}

/// Replays a prepared sequence of readings, one per poll
#[derive(Debug, Clone, Default)]
pub struct ScriptedSensor {
    queue: VecDeque<Option<AccelSample>>,
}

impl ScriptedSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Option<AccelSample>) -> &mut Self {
        self.queue.push_back(sample);
        self
    }

    /// `frames` readings of a sensor at rest
    pub fn push_rest(&mut self, frames: usize) -> &mut Self {
        self.queue
            .extend(std::iter::repeat_n(Some(AccelSample::REST), frames));
        self
    }

    /// A throw: `frames` readings of `peak`
    pub fn push_gesture(&mut self, peak: AccelSample, frames: usize) -> &mut Self {
        self.queue.extend(std::iter::repeat_n(Some(peak), frames));
        self
    }

    /// `frames` polls that return no data
    pub fn push_dropout(&mut self, frames: usize) -> &mut Self {
        self.queue.extend(std::iter::repeat_n(None, frames));
        self
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl AccelSensor for ScriptedSensor {
    fn poll(&mut self) -> Option<AccelSample> {
        self.queue.pop_front().flatten()
    }
}
