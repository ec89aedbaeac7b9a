//! Array-backed action buffer with independent cursors over shared slots.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{BufferError, BufferResult};

type Slots<T> = Arc<RwLock<Box<[Option<T>]>>>;

/// A fixed-capacity sequence of pending actions.
///
/// Views created by [`slice`](Self::slice), [`duplicate`](Self::duplicate)
/// and [`as_read_only`](Self::as_read_only) share the same slots, so a `put`
/// through one view is visible through every other view. Cursors are never
/// shared.
pub struct ActionBuffer<T> {
    slots: Slots<T>,
    /// First slot of this view inside the shared storage.
    offset: usize,
    capacity: usize,
    limit: usize,
    position: usize,
    mark: Option<usize>,
    read_only: bool,
}

impl<T: Clone> ActionBuffer<T> {
    /// Allocate an empty buffer ready for writing.
    #[must_use]
    pub fn allocate(capacity: usize) -> Self {
        let slots: Box<[Option<T>]> = (0..capacity).map(|_| None).collect();
        Self {
            slots: Arc::new(RwLock::new(slots)),
            offset: 0,
            capacity,
            limit: capacity,
            position: 0,
            mark: None,
            read_only: false,
        }
    }

    /// Wrap existing actions; capacity and limit equal their count.
    #[must_use]
    pub fn wrap(actions: Vec<T>) -> Self {
        let capacity = actions.len();
        let slots: Box<[Option<T>]> = actions.into_iter().map(Some).collect();
        Self {
            slots: Arc::new(RwLock::new(slots)),
            offset: 0,
            capacity,
            limit: capacity,
            position: 0,
            mark: None,
            read_only: false,
        }
    }

    // ==================== Cursors ====================

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Number of elements between the position and the limit.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.limit - self.position
    }

    #[must_use]
    pub const fn has_remaining(&self) -> bool {
        self.position < self.limit
    }

    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Move the position. Discards the mark if it lies beyond the new position.
    pub fn set_position(&mut self, position: usize) -> BufferResult<()> {
        if position > self.limit {
            return Err(BufferError::InvalidPosition {
                position,
                limit: self.limit,
            });
        }
        self.position = position;
        if self.mark.is_some_and(|mark| mark > position) {
            self.mark = None;
        }
        Ok(())
    }

    /// Move the limit, pulling the position (and mark) back if needed.
    pub fn set_limit(&mut self, limit: usize) -> BufferResult<()> {
        if limit > self.capacity {
            return Err(BufferError::InvalidLimit {
                limit,
                capacity: self.capacity,
            });
        }
        self.limit = limit;
        if self.position > limit {
            self.position = limit;
        }
        if self.mark.is_some_and(|mark| mark > limit) {
            self.mark = None;
        }
        Ok(())
    }

    /// Remember the current position.
    pub fn mark(&mut self) {
        self.mark = Some(self.position);
    }

    /// Return to the remembered position.
    pub fn reset(&mut self) -> BufferResult<()> {
        let mark = self.mark.ok_or(BufferError::InvalidMark)?;
        self.position = mark;
        Ok(())
    }

    /// Prepare for writing: position 0, limit at capacity, mark discarded.
    ///
    /// The slots themselves are left as they are.
    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.capacity;
        self.mark = None;
    }

    /// Switch from writing to reading what was written.
    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
        self.mark = None;
    }

    /// Read again from the start without touching the limit.
    pub fn rewind(&mut self) {
        self.position = 0;
        self.mark = None;
    }

    // ==================== Relative access ====================

    /// Read the element at the position and advance.
    pub fn get(&mut self) -> BufferResult<T> {
        if !self.has_remaining() {
            return Err(BufferError::Underflow {
                needed: 1,
                remaining: 0,
            });
        }
        let value = self.read_slot(self.position)?;
        self.position += 1;
        Ok(value)
    }

    /// Write at the position and advance. Fails when `position == limit`.
    pub fn put(&mut self, value: T) -> BufferResult<()> {
        self.ensure_writable()?;
        if !self.has_remaining() {
            return Err(BufferError::Overflow {
                needed: 1,
                remaining: 0,
            });
        }
        self.slots.write()[self.offset + self.position] = Some(value);
        self.position += 1;
        Ok(())
    }

    /// Read `len` elements starting at the position and advance past them.
    ///
    /// Nothing is consumed if fewer than `len` elements remain.
    pub fn get_slice(&mut self, len: usize) -> BufferResult<Vec<T>> {
        if len > self.remaining() {
            return Err(BufferError::Underflow {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slots = self.slots.read();
        let start = self.offset + self.position;
        let mut out = Vec::with_capacity(len);
        for (i, slot) in slots[start..start + len].iter().enumerate() {
            match slot {
                Some(value) => out.push(value.clone()),
                None => return Err(BufferError::Uninitialized(self.position + i)),
            }
        }
        drop(slots);
        self.position += len;
        Ok(out)
    }

    /// Write every element of `values`, or none of them if they do not fit.
    pub fn put_slice(&mut self, values: &[T]) -> BufferResult<()> {
        self.ensure_writable()?;
        if values.len() > self.remaining() {
            return Err(BufferError::Overflow {
                needed: values.len(),
                remaining: self.remaining(),
            });
        }
        let mut slots = self.slots.write();
        let start = self.offset + self.position;
        for (slot, value) in slots[start..start + values.len()].iter_mut().zip(values) {
            *slot = Some(value.clone());
        }
        drop(slots);
        self.position += values.len();
        Ok(())
    }

    /// Move the remaining elements of `src` into this buffer.
    ///
    /// Both positions advance by the number of elements moved.
    pub fn put_buffer(&mut self, src: &mut Self) -> BufferResult<()> {
        self.ensure_writable()?;
        if Arc::ptr_eq(&self.slots, &src.slots) {
            return Err(BufferError::SelfCopy);
        }
        let values = {
            let needed = src.remaining();
            if needed > self.remaining() {
                return Err(BufferError::Overflow {
                    needed,
                    remaining: self.remaining(),
                });
            }
            src.get_slice(needed)?
        };
        self.put_slice(&values)
    }

    // ==================== Absolute access ====================

    /// Read at `index` without moving the position.
    pub fn get_at(&self, index: usize) -> BufferResult<T> {
        self.check_index(index)?;
        self.read_slot(index)
    }

    /// Write at `index` without moving the position.
    pub fn put_at(&mut self, index: usize, value: T) -> BufferResult<()> {
        self.ensure_writable()?;
        self.check_index(index)?;
        self.slots.write()[self.offset + index] = Some(value);
        Ok(())
    }

    // ==================== Views ====================

    /// A view of the remaining elements: its slot 0 is this buffer's
    /// position, its capacity and limit are this buffer's remaining count.
    #[must_use]
    pub fn slice(&self) -> Self {
        let remaining = self.remaining();
        Self {
            slots: Arc::clone(&self.slots),
            offset: self.offset + self.position,
            capacity: remaining,
            limit: remaining,
            position: 0,
            mark: None,
            read_only: self.read_only,
        }
    }

    /// A view over the same slots with a copy of the current cursors.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            offset: self.offset,
            capacity: self.capacity,
            limit: self.limit,
            position: self.position,
            mark: self.mark,
            read_only: self.read_only,
        }
    }

    /// A duplicate that rejects every mutating operation.
    #[must_use]
    pub fn as_read_only(&self) -> Self {
        let mut view = self.duplicate();
        view.read_only = true;
        view
    }

    /// Move the remaining elements to the start and prepare for writing after them.
    pub fn compact(&mut self) -> BufferResult<()> {
        self.ensure_writable()?;
        let remaining = self.remaining();
        {
            let mut slots = self.slots.write();
            let start = self.offset + self.position;
            for i in 0..remaining {
                let value = slots[start + i].take();
                slots[self.offset + i] = value;
            }
        }
        self.position = remaining;
        self.limit = self.capacity;
        self.mark = None;
        Ok(())
    }

    // ==================== Internals ====================

    fn ensure_writable(&self) -> BufferResult<()> {
        if self.read_only {
            Err(BufferError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn check_index(&self, index: usize) -> BufferResult<()> {
        if index >= self.limit {
            return Err(BufferError::IndexOutOfBounds {
                index,
                limit: self.limit,
            });
        }
        Ok(())
    }

    fn read_slot(&self, index: usize) -> BufferResult<T> {
        self.slots.read()[self.offset + index]
            .clone()
            .ok_or(BufferError::Uninitialized(index))
    }
}

impl<T: Clone + PartialEq> PartialEq for ActionBuffer<T> {
    /// Two buffers are equal when their remaining elements are equal.
    fn eq(&self, other: &Self) -> bool {
        if self.remaining() != other.remaining() {
            return false;
        }
        (0..self.remaining()).all(|i| {
            let ours = self.read_slot(self.position + i).ok();
            let theirs = other.read_slot(other.position + i).ok();
            ours == theirs
        })
    }
}

impl<T> fmt::Debug for ActionBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionBuffer")
            .field("position", &self.position)
            .field("limit", &self.limit)
            .field("capacity", &self.capacity)
            .field("mark", &self.mark)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_cursors<T: Clone>(buffer: &ActionBuffer<T>, capacity: usize) {
        assert!(buffer.position() <= buffer.limit());
        assert!(buffer.limit() <= buffer.capacity());
        assert_eq!(buffer.capacity(), capacity);
    }

    #[test]
    fn test_put_flip_get() {
        let mut buffer = ActionBuffer::allocate(4);
        buffer.put(1).unwrap();
        buffer.put(2).unwrap();
        buffer.put(3).unwrap();
        assert_eq!(buffer.position(), 3);

        buffer.flip();
        assert_eq!(buffer.limit(), 3);
        assert_eq!(buffer.position(), 0);

        assert_eq!(buffer.get().unwrap(), 1);
        assert_eq!(buffer.get().unwrap(), 2);
        assert_eq!(buffer.get().unwrap(), 3);
        assert_eq!(
            buffer.get(),
            Err(BufferError::Underflow {
                needed: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn test_put_at_limit_fails_without_overwriting() {
        let mut buffer = ActionBuffer::allocate(2);
        buffer.put('a').unwrap();
        buffer.put('b').unwrap();
        assert!(matches!(buffer.put('c'), Err(BufferError::Overflow { .. })));

        buffer.flip();
        assert_eq!(buffer.get_slice(2).unwrap(), vec!['a', 'b']);
    }

    #[test]
    fn test_cursor_invariants_hold_across_sequence() {
        let mut buffer = ActionBuffer::allocate(8);
        for i in 0..5 {
            buffer.put(i).unwrap();
            assert_cursors(&buffer, 8);
        }
        buffer.flip();
        assert_cursors(&buffer, 8);
        buffer.get().unwrap();
        assert_cursors(&buffer, 8);
        let slice = buffer.slice();
        assert_cursors(&slice, 4);
        buffer.rewind();
        assert_cursors(&buffer, 8);
        assert_eq!(buffer.limit(), 5);
        buffer.clear();
        assert_cursors(&buffer, 8);
        assert_eq!(buffer.limit(), 8);
        assert!(buffer.set_position(9).is_err());
        assert!(buffer.set_limit(9).is_err());
        assert_cursors(&buffer, 8);
    }

    #[test]
    fn test_set_limit_pulls_position_back() {
        let mut buffer: ActionBuffer<u8> = ActionBuffer::allocate(10);
        buffer.set_position(8).unwrap();
        buffer.mark();
        buffer.set_limit(5).unwrap();
        assert_eq!(buffer.position(), 5);
        assert_eq!(buffer.reset(), Err(BufferError::InvalidMark));
    }

    #[test]
    fn test_mark_and_reset() {
        let mut buffer = ActionBuffer::wrap(vec![10, 20, 30]);
        buffer.get().unwrap();
        buffer.mark();
        buffer.get().unwrap();
        buffer.get().unwrap();
        buffer.reset().unwrap();
        assert_eq!(buffer.get().unwrap(), 20);
    }

    #[test]
    fn test_absolute_access_checks_limit() {
        let mut buffer = ActionBuffer::allocate(4);
        buffer.put_at(3, 7).unwrap();
        assert_eq!(buffer.get_at(3).unwrap(), 7);
        assert_eq!(buffer.get_at(0), Err(BufferError::Uninitialized(0)));

        buffer.set_limit(2).unwrap();
        assert_eq!(
            buffer.get_at(3),
            Err(BufferError::IndexOutOfBounds { index: 3, limit: 2 })
        );
        assert!(buffer.put_at(2, 1).is_err());
    }

    #[test]
    fn test_bulk_put_is_all_or_nothing() {
        let mut buffer = ActionBuffer::allocate(3);
        buffer.put(0).unwrap();
        assert!(buffer.put_slice(&[1, 2, 3]).is_err());
        assert_eq!(buffer.position(), 1);
        buffer.put_slice(&[1, 2]).unwrap();
        assert_eq!(buffer.position(), 3);
    }

    #[test]
    fn test_slice_shares_slots_with_independent_cursors() {
        let mut buffer = ActionBuffer::wrap(vec![1, 2, 3, 4]);
        buffer.get().unwrap();

        let mut slice = buffer.slice();
        assert_eq!(slice.capacity(), 3);
        assert_eq!(slice.get_at(0).unwrap(), 2);

        slice.put_at(0, 20).unwrap();
        assert_eq!(buffer.get_at(1).unwrap(), 20);

        slice.get().unwrap();
        assert_eq!(buffer.position(), 1);
    }

    #[test]
    fn test_duplicate_copies_cursors() {
        let mut buffer = ActionBuffer::allocate(4);
        buffer.put(5).unwrap();
        let mut dup = buffer.duplicate();
        assert_eq!(dup.position(), 1);

        dup.put(6).unwrap();
        assert_eq!(buffer.position(), 1);
        assert_eq!(buffer.get_at(1).unwrap(), 6);
    }

    #[test]
    fn test_read_only_rejects_mutation() {
        let mut buffer = ActionBuffer::allocate(4);
        buffer.put(1).unwrap();
        let mut view = buffer.as_read_only();

        assert_eq!(view.put(2), Err(BufferError::ReadOnly));
        assert_eq!(view.put_at(0, 2), Err(BufferError::ReadOnly));
        assert_eq!(view.put_slice(&[2]), Err(BufferError::ReadOnly));
        assert_eq!(view.compact(), Err(BufferError::ReadOnly));
        assert!(view.slice().is_read_only());

        view.flip();
        assert_eq!(view.get().unwrap(), 1);
    }

    #[test]
    fn test_compact_keeps_unread_tail() {
        let mut buffer = ActionBuffer::wrap(vec![1, 2, 3, 4]);
        buffer.get().unwrap();
        buffer.get().unwrap();
        buffer.compact().unwrap();
        assert_eq!(buffer.position(), 2);
        assert_eq!(buffer.limit(), 4);
        buffer.flip();
        assert_eq!(buffer.get_slice(2).unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_put_buffer_moves_remaining() {
        let mut src = ActionBuffer::wrap(vec![1, 2, 3]);
        let mut dst = ActionBuffer::allocate(5);
        dst.put_buffer(&mut src).unwrap();
        assert!(!src.has_remaining());
        assert_eq!(dst.position(), 3);

        let mut same = dst.duplicate();
        assert_eq!(dst.put_buffer(&mut same), Err(BufferError::SelfCopy));

        let mut big = ActionBuffer::wrap(vec![0; 3]);
        assert!(matches!(
            dst.put_buffer(&mut big),
            Err(BufferError::Overflow { .. })
        ));
        assert_eq!(big.position(), 0);
    }

    #[test]
    fn test_equality_compares_remaining() {
        let mut a = ActionBuffer::wrap(vec![9, 1, 2]);
        let b = ActionBuffer::wrap(vec![1, 2]);
        assert_ne!(a, b);
        a.get().unwrap();
        assert_eq!(a, b);
    }
}
