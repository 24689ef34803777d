use log::warn;

use crate::{ds::RingBuffer, StateVector};

/// A single experience: state, action, reward and the utility of the successor
///
/// Fields are filled in at different times and stay `None` until first written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Experience {
    pub x: Option<StateVector>,
    pub a: Option<usize>,
    pub r: Option<f64>,
    pub u1: Option<f64>,
}

/// The experience buffer of truncated temporal differences
///
/// Holds the `m + 1` most recent experiences. Index 0 is the current experience, index
/// `m` the oldest one retained. Records are overwritten in place as time ticks.
#[derive(Debug, Clone)]
pub struct ExperienceBuffer {
    ring: RingBuffer<Experience>,
    nsteps: u64,
}

impl ExperienceBuffer {
    /// Construct an empty buffer for truncation period `m`
    pub fn new(m: usize) -> Self {
        Self {
            ring: RingBuffer::new(m + 1),
            nsteps: 0,
        }
    }

    /// Construct a buffer for truncation period `m`, copying in as many of the most recent
    /// experiences of `other` as fit
    ///
    /// The step count becomes the number of copied experiences minus one. It may
    /// undercount by one, which only delays the next update.
    pub fn resized(m: usize, other: &ExperienceBuffer) -> Self {
        let mut buffer = Self::new(m);
        let available = usize::try_from(other.nsteps).unwrap_or(usize::MAX);
        let copied = buffer.ring.len().min(other.ring.len()).min(available);
        for t in 0..copied {
            buffer.ring[t] = other.ring[t].clone();
        }
        let dropped = other.ring.len().min(available) - copied;
        if dropped > 0 {
            warn!("Experience buffer resized to m = {m}, dropping {dropped} experiences");
        }
        buffer.nsteps = copied.saturating_sub(1) as u64;
        buffer
    }

    /// The truncation period
    pub fn m(&self) -> usize {
        self.ring.len() - 1
    }

    /// Number of steps made since construction or the last reset
    pub fn nsteps(&self) -> u64 {
        self.nsteps
    }

    /// Record the current state-action pair at index 0 and the successor utility of the
    /// previous experience at index 1
    pub fn insert(&mut self, x: &StateVector, a: usize, u1: f64) {
        self.ring[1].u1 = Some(u1);

        let current = &mut self.ring[0];
        match current.x.as_mut() {
            Some(stored) => stored.assign(x),
            None => current.x = Some(x.clone()),
        }
        current.a = Some(a);
    }

    /// Record the reward of the previous experience
    pub fn insert_reward(&mut self, r: f64) {
        self.ring[1].r = Some(r);
    }

    /// Record a terminal successor utility of 0 for the previous experience
    pub fn insert_terminal(&mut self) {
        self.ring[1].u1 = Some(0.0);
    }

    /// Advance time by one step
    pub fn tick(&mut self) {
        self.ring.tick();
        self.nsteps += 1;
    }

    /// Zero the step count; the records stay in place and are overwritten later
    pub fn reset(&mut self) {
        self.nsteps = 0;
    }

    pub fn experience(&self, t: usize) -> &Experience {
        &self.ring[t]
    }

    pub fn x(&self, t: usize) -> Option<&StateVector> {
        self.ring[t].x.as_ref()
    }

    pub fn a(&self, t: usize) -> Option<usize> {
        self.ring[t].a
    }

    /// Reward at index `t`, 0 if never written
    pub fn r(&self, t: usize) -> f64 {
        self.ring[t].r.unwrap_or(0.0)
    }

    /// Successor utility at index `t`, 0 if never written
    pub fn u1(&self, t: usize) -> f64 {
        self.ring[t].u1.unwrap_or(0.0)
    }
}
