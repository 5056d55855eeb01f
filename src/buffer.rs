//! The buffer and cursor protocol the engines run against.
//!
//! A [`Source`] is a read window with a position: the engines peek ahead
//! without consuming and only [`advance`](Source::advance) over units that
//! were fully converted. A [`Sink`] is a write window with a fixed amount of
//! remaining room. Because nothing is consumed or written before a whole code
//! point is known to succeed, no rollback is ever needed.
//!
//! Provided implementations:
//!
//! - [`SliceSource`] and [`SliceSink`]: contiguous windows over caller-owned
//!   slices.
//! - [`QueueSource`]: a growable, possibly non-contiguous input queue for
//!   streaming callers that refill between passes.
//! - `Vec<T>` as a sink bounded by its spare capacity.
//! - [`Counter`]: a sink that only counts.
//! - [`Generic`]: hides contiguity, forcing the unit-at-a-time path.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::marker::PhantomData;

/// A readable window of input units.
pub trait Source<T: Copy> {
    /// Number of units consumed so far.
    fn position(&self) -> usize;

    /// Number of units still available.
    fn remaining(&self) -> usize;

    /// Returns the unit `offset` places past the current position.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= self.remaining()`.
    fn peek(&self, offset: usize) -> T;

    /// Consumes `n` units.
    ///
    /// # Panics
    ///
    /// Panics if `n > self.remaining()`.
    fn advance(&mut self, n: usize);

    /// The remaining units as one contiguous slice, if the storage allows it.
    ///
    /// The engines use this for bulk ASCII scanning only; returning `None`
    /// never changes a result.
    #[inline]
    fn as_slice(&self) -> Option<&[T]> {
        None
    }

    /// Returns `true` if at least one unit is available.
    #[inline]
    fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }
}

/// A writable window of output units.
pub trait Sink<T: Copy> {
    /// Number of units written so far.
    fn position(&self) -> usize;

    /// Number of units that can still be written.
    fn remaining(&self) -> usize;

    /// Writes one unit.
    ///
    /// # Panics
    ///
    /// May panic if `self.remaining() == 0`.
    fn push(&mut self, value: T);

    /// Writes every unit of `values`.
    ///
    /// # Panics
    ///
    /// May panic if `values.len() > self.remaining()`.
    #[inline]
    fn extend_from_slice(&mut self, values: &[T]) {
        for &value in values {
            self.push(value);
        }
    }
}

// =============================================================================
// Contiguous windows
// =============================================================================

/// A read cursor over a borrowed slice.
///
/// ```
/// use utf8conv::{Source, SliceSource};
///
/// let mut src = SliceSource::new(b"abc");
/// src.advance(1);
/// assert_eq!(src.peek(0), b'b');
/// assert_eq!(src.remaining(), 2);
/// assert_eq!(src.remaining_slice(), b"bc");
/// ```
#[derive(Debug, Clone)]
pub struct SliceSource<'a, T> {
    data: &'a [T],
    pos: usize,
}

impl<'a, T: Copy> SliceSource<'a, T> {
    /// Creates a cursor at the start of `data`.
    #[inline]
    pub const fn new(data: &'a [T]) -> Self {
        Self { data, pos: 0 }
    }

    /// Creates a cursor over `data[..limit]` starting at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position > limit` or `limit > data.len()`.
    pub fn with_bounds(data: &'a [T], position: usize, limit: usize) -> Self {
        assert!(
            position <= limit && limit <= data.len(),
            "invalid bounds {}..{} for a slice of length {}",
            position,
            limit,
            data.len()
        );
        Self {
            data: &data[..limit],
            pos: position,
        }
    }

    /// The units not yet consumed.
    #[inline]
    pub fn remaining_slice(&self) -> &'a [T] {
        &self.data[self.pos..]
    }

    /// The units already consumed.
    #[inline]
    pub fn consumed(&self) -> &'a [T] {
        &self.data[..self.pos]
    }
}

impl<T: Copy> Source<T> for SliceSource<'_, T> {
    #[inline]
    fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    fn peek(&self, offset: usize) -> T {
        self.data[self.pos + offset]
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        assert!(n <= self.remaining(), "advanced past the end of the source");
        self.pos += n;
    }

    #[inline]
    fn as_slice(&self) -> Option<&[T]> {
        Some(self.remaining_slice())
    }
}

/// A write cursor over a borrowed mutable slice.
///
/// ```
/// use utf8conv::{Sink, SliceSink};
///
/// let mut out = [0u8; 4];
/// let mut dst = SliceSink::new(&mut out);
/// dst.push(b'h');
/// dst.push(b'i');
/// assert_eq!(dst.written(), b"hi");
/// assert_eq!(dst.remaining(), 2);
/// ```
#[derive(Debug)]
pub struct SliceSink<'a, T> {
    data: &'a mut [T],
    pos: usize,
}

impl<'a, T: Copy> SliceSink<'a, T> {
    /// Creates a cursor at the start of `data`.
    #[inline]
    pub fn new(data: &'a mut [T]) -> Self {
        Self { data, pos: 0 }
    }

    /// Creates a cursor over `data[..limit]` starting at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position > limit` or `limit > data.len()`.
    pub fn with_bounds(data: &'a mut [T], position: usize, limit: usize) -> Self {
        assert!(
            position <= limit && limit <= data.len(),
            "invalid bounds {}..{} for a slice of length {}",
            position,
            limit,
            data.len()
        );
        Self {
            data: &mut data[..limit],
            pos: position,
        }
    }

    /// The units written so far.
    #[inline]
    pub fn written(&self) -> &[T] {
        &self.data[..self.pos]
    }
}

impl<T: Copy> Sink<T> for SliceSink<'_, T> {
    #[inline]
    fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    fn push(&mut self, value: T) {
        self.data[self.pos] = value;
        self.pos += 1;
    }

    #[inline]
    fn extend_from_slice(&mut self, values: &[T]) {
        let end = self.pos + values.len();
        self.data[self.pos..end].copy_from_slice(values);
        self.pos = end;
    }
}

// =============================================================================
// Growable and non-contiguous storage
// =============================================================================

/// A queue of pending input for streaming callers.
///
/// New data is appended with [`extend`](Self::extend); converted units are
/// dropped from the front. Whatever a pass leaves behind, such as the first
/// bytes of a sequence split across reads, stays queued for the next pass.
///
/// ```
/// use utf8conv::{CoderResult, QueueSource, Source, decode};
///
/// let mut queue = QueueSource::new();
/// let mut out = Vec::with_capacity(8);
///
/// queue.extend(&[b'a', 0xE2, 0x82]);
/// assert_eq!(decode(&mut queue, &mut out), CoderResult::Underflow);
/// assert_eq!(queue.remaining(), 2);
///
/// queue.extend(&[0xAC]);
/// assert_eq!(decode(&mut queue, &mut out), CoderResult::Underflow);
/// assert_eq!(out, [0x61, 0x20AC]);
/// assert_eq!(queue.position(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueueSource<T> {
    queue: VecDeque<T>,
    consumed: usize,
}

impl<T: Copy> QueueSource<T> {
    /// Creates an empty queue.
    #[inline]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            consumed: 0,
        }
    }

    /// Appends units to the back of the queue.
    #[inline]
    pub fn extend(&mut self, units: &[T]) {
        self.queue.extend(units.iter().copied());
    }

    /// Returns `true` if nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Removes and returns everything still queued.
    pub fn take_remaining(&mut self) -> Vec<T> {
        self.consumed += self.queue.len();
        self.queue.drain(..).collect()
    }
}

impl<T: Copy> Source<T> for QueueSource<T> {
    #[inline]
    fn position(&self) -> usize {
        self.consumed
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    fn peek(&self, offset: usize) -> T {
        self.queue[offset]
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        assert!(n <= self.queue.len(), "advanced past the end of the queue");
        self.queue.drain(..n);
        self.consumed += n;
    }

    #[inline]
    fn as_slice(&self) -> Option<&[T]> {
        match self.queue.as_slices() {
            (front, []) => Some(front),
            _ => None,
        }
    }
}

/// A `Vec` accepts output up to its current capacity; reserve more between
/// passes to let an `Overflow` make progress.
impl<T: Copy> Sink<T> for Vec<T> {
    #[inline]
    fn position(&self) -> usize {
        self.len()
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.capacity() - self.len()
    }

    #[inline]
    fn push(&mut self, value: T) {
        Vec::push(self, value);
    }

    #[inline]
    fn extend_from_slice(&mut self, values: &[T]) {
        Vec::extend_from_slice(self, values);
    }
}

/// A sink that discards output and counts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter<T> {
    count: usize,
    _marker: PhantomData<T>,
}

impl<T> Counter<T> {
    /// Creates a counter at zero.
    #[inline]
    pub const fn new() -> Self {
        Self {
            count: 0,
            _marker: PhantomData,
        }
    }

    /// Number of units written.
    #[inline]
    pub const fn count(&self) -> usize {
        self.count
    }
}

impl<T> Default for Counter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> Sink<T> for Counter<T> {
    #[inline]
    fn position(&self) -> usize {
        self.count
    }

    #[inline]
    fn remaining(&self) -> usize {
        usize::MAX - self.count
    }

    #[inline]
    fn push(&mut self, _value: T) {
        self.count += 1;
    }

    #[inline]
    fn extend_from_slice(&mut self, values: &[T]) {
        self.count += values.len();
    }
}

/// Wraps a source or sink and hides its contiguous storage.
///
/// Results and cursor positions are the same with or without the wrapper;
/// only the bulk ASCII scan is skipped.
#[derive(Debug, Clone)]
pub struct Generic<B>(pub B);

impl<T: Copy, S: Source<T>> Source<T> for Generic<S> {
    #[inline]
    fn position(&self) -> usize {
        self.0.position()
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.0.remaining()
    }

    #[inline]
    fn peek(&self, offset: usize) -> T {
        self.0.peek(offset)
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        self.0.advance(n);
    }
}

impl<T: Copy, S: Sink<T>> Sink<T> for Generic<S> {
    #[inline]
    fn position(&self) -> usize {
        self.0.position()
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.0.remaining()
    }

    #[inline]
    fn push(&mut self, value: T) {
        self.0.push(value);
    }
}
