#![allow(clippy::len_without_is_empty)]
use std::ops::{Index, IndexMut};

/// A fixed-size ring buffer with virtual indexing
///
/// Index 0 always addresses the most recent slot, larger indices reach further into
/// the past. [`tick`](RingBuffer::tick) advances time by moving the origin one slot
/// backward, so the oldest slot becomes the new index 0 without moving any element.
#[derive(Debug, Default, Clone)]
pub struct RingBuffer<T> {
    buffer: Vec<T>,
    origin: usize,
}

impl<T> RingBuffer<T> {
    /// Constructs a new `RingBuffer` from a provided `Vec`, element `i` at virtual index `i`
    pub fn from(data: Vec<T>) -> Self {
        Self {
            buffer: data,
            origin: 0,
        }
    }

    /// Returns the buffer length
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Rotate the virtual origin one slot backward
    pub fn tick(&mut self) {
        let len = self.len();
        self.origin = (self.origin + len - 1) % len;
    }

    /// Iterate from virtual index 0 toward the oldest slot
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len()).map(move |t| &self[t])
    }

    fn physical(&self, t: usize) -> usize {
        (t + self.origin) % self.len()
    }
}

impl<T: Default> RingBuffer<T> {
    /// Construct a new `RingBuffer` of `len` default values
    pub fn new(len: usize) -> Self {
        Self::from(std::iter::repeat_with(T::default).take(len).collect())
    }
}

impl<T> Index<usize> for RingBuffer<T> {
    type Output = T;

    fn index(&self, t: usize) -> &Self::Output {
        &self.buffer[self.physical(t)]
    }
}

impl<T> IndexMut<usize> for RingBuffer<T> {
    fn index_mut(&mut self, t: usize) -> &mut Self::Output {
        let ix = self.physical(t);
        &mut self.buffer[ix]
    }
}
