//! A sliding window over an owned, resizable backing array.

use core::ops::{Index, IndexMut};
use core::slice;

use crate::error::BufferError;

/// A contiguous window `[start_offset, end_offset)` over an owned backing
/// array, with an absolute-position counter that survives window shifts.
///
/// The window never wraps: once `end_offset` reaches the capacity, producers
/// must [`compact`](Buffer::compact) or [`set_capacity`](Buffer::set_capacity)
/// to reclaim tail space. Resizing is explicit and possibly reallocating;
/// there is no implicit copy-on-grow.
///
/// Iterating over `&Buffer<T>` yields the live window read-only. The borrow
/// rules make mutating the window during iteration unrepresentable.
#[derive(Debug, Clone)]
pub struct Buffer<T> {
    array: Option<Box<[T]>>,
    start_offset: usize,
    end_offset: usize,
    absolute_position: u64,
}

impl<T> Buffer<T> {
    /// Creates a buffer with no backing store. Any access to the backing
    /// store before [`set_capacity`](Buffer::set_capacity) fails with
    /// [`BufferError::CapacityNotSet`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            array: None,
            start_offset: 0,
            end_offset: 0,
            absolute_position: 0,
        }
    }

    /// Creates a buffer with an initial capacity.
    ///
    /// # Errors
    ///
    /// Fails if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, BufferError>
    where
        T: Default + Clone,
    {
        let mut buffer = Self::new();
        buffer.set_capacity(capacity, false)?;
        Ok(buffer)
    }

    fn backing(&self) -> Result<&[T], BufferError> {
        self.array.as_deref().ok_or(BufferError::CapacityNotSet)
    }

    fn backing_mut(&mut self) -> Result<&mut [T], BufferError> {
        self.array.as_deref_mut().ok_or(BufferError::CapacityNotSet)
    }

    /// Capacity of the backing store.
    ///
    /// # Errors
    ///
    /// Fails if no capacity has been set yet.
    pub fn capacity(&self) -> Result<usize, BufferError> {
        self.backing().map(<[T]>::len)
    }

    /// Number of elements in the live window.
    #[must_use]
    pub fn count(&self) -> usize {
        self.end_offset - self.start_offset
    }

    /// `true` if the live window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Physical offset of the window start.
    #[must_use]
    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    /// Physical offset one past the window end.
    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    /// Cumulative count of elements that have logically exited the front of
    /// the window, independent of physical layout. Resizes and compaction do
    /// not affect it.
    #[must_use]
    pub fn absolute_position(&self) -> u64 {
        self.absolute_position
    }

    /// Unused tail capacity `capacity - end_offset`, or 0 if no capacity has
    /// been set.
    #[must_use]
    pub fn tail_capacity(&self) -> usize {
        self.array
            .as_deref()
            .map_or(0, |array| array.len() - self.end_offset)
    }

    /// Replaces the backing store with one of the requested capacity, copying
    /// the live window into it. Reallocates only if `capacity` differs from
    /// the current one.
    ///
    /// With `preserve_offsets` the window keeps its current start offset (and
    /// must therefore still fit); otherwise it is repacked to start at
    /// physical slot 0. The absolute position is unaffected either way.
    ///
    /// # Errors
    ///
    /// Fails if `capacity` is zero or smaller than the current window length,
    /// or if a preserved window would not fit.
    pub fn set_capacity(&mut self, capacity: usize, preserve_offsets: bool) -> Result<(), BufferError>
    where
        T: Default + Clone,
    {
        if capacity < 1 {
            return Err(BufferError::CapacityTooSmall { requested: capacity });
        }
        let count = self.count();
        if capacity < count {
            return Err(BufferError::CapacityBelowCount {
                requested: capacity,
                count,
            });
        }

        match self.array.as_deref().map(<[T]>::len) {
            None => {
                self.array = Some((0..capacity).map(|_| T::default()).collect());
            }
            // Same capacity: nothing to do, offsets are left alone.
            Some(current) if current == capacity => {}
            Some(_) => {
                let start = if preserve_offsets { self.start_offset } else { 0 };
                if start + count > capacity {
                    return Err(BufferError::OffsetOutOfRange {
                        start,
                        end: start + count,
                        capacity,
                    });
                }
                let window: Vec<T> = self.window().to_vec();
                let mut fresh: Box<[T]> = (0..capacity).map(|_| T::default()).collect();
                fresh[start..start + count].clone_from_slice(&window);
                self.array = Some(fresh);
                self.start_offset = start;
                self.end_offset = start + count;
            }
        }
        Ok(())
    }

    /// Moves the window start. The absolute position is adjusted by the
    /// signed delta, so it stays monotonic with respect to elements that have
    /// exited the front.
    ///
    /// # Errors
    ///
    /// Fails if `value` exceeds the end offset.
    pub fn set_start_offset(&mut self, value: usize) -> Result<(), BufferError> {
        if value > self.end_offset {
            return Err(BufferError::OffsetOutOfRange {
                start: value,
                end: self.end_offset,
                capacity: self.array.as_deref().map_or(0, <[T]>::len),
            });
        }
        let delta = value as i64 - self.start_offset as i64;
        self.absolute_position = self.absolute_position.wrapping_add_signed(delta);
        self.start_offset = value;
        Ok(())
    }

    /// Moves the window end, keeping the current start.
    ///
    /// # Errors
    ///
    /// Same contract as [`set_bounds`](Buffer::set_bounds).
    pub fn set_end_offset(&mut self, value: usize) -> Result<(), BufferError> {
        self.set_bounds(self.start_offset, value)
    }

    /// Sets both window boundaries at once, without touching the absolute
    /// position.
    ///
    /// # Errors
    ///
    /// Fails unless `start <= end < capacity`. The strict upper bound is the
    /// contract callers rely on; use [`set_count`](Buffer::set_count) to fill
    /// the final slot.
    pub fn set_bounds(&mut self, start: usize, end: usize) -> Result<(), BufferError> {
        let capacity = self.capacity()?;
        if start <= end && end < capacity {
            self.start_offset = start;
            self.end_offset = end;
            Ok(())
        } else {
            Err(BufferError::OffsetOutOfRange { start, end, capacity })
        }
    }

    /// Extends or shrinks the window from the current start to hold `value`
    /// elements. Unlike [`set_bounds`](Buffer::set_bounds), the window may
    /// end exactly at the capacity.
    ///
    /// # Errors
    ///
    /// Fails if `start_offset + value` would exceed the capacity.
    pub fn set_count(&mut self, value: usize) -> Result<(), BufferError> {
        let capacity = self.capacity()?;
        if value > capacity - self.start_offset {
            return Err(BufferError::CountOutOfRange {
                requested: value,
                start: self.start_offset,
                capacity,
            });
        }
        self.end_offset = self.start_offset + value;
        Ok(())
    }

    /// Resets both offsets to zero. Capacity and absolute position are left
    /// untouched.
    pub fn clear(&mut self) {
        self.start_offset = 0;
        self.end_offset = 0;
    }

    /// Shifts the live window to physical offset 0 in place, reclaiming tail
    /// capacity without reallocating. Compaction is physical movement, not
    /// logical consumption: the absolute position is unaffected.
    ///
    /// # Errors
    ///
    /// Fails if no capacity has been set.
    pub fn compact(&mut self) -> Result<(), BufferError> {
        let start = self.start_offset;
        let count = self.count();
        if start > 0 {
            let end = self.end_offset;
            self.backing_mut()?[..end].rotate_left(start);
            self.start_offset = 0;
            self.end_offset = count;
        }
        Ok(())
    }

    /// Borrows the element at logical index `index` within the window.
    ///
    /// # Errors
    ///
    /// Fails if `index` is outside `[0, count)`.
    pub fn get(&self, index: usize) -> Result<&T, BufferError> {
        if index >= self.count() {
            return Err(BufferError::IndexOutOfRange {
                index,
                count: self.count(),
            });
        }
        Ok(&self.backing()?[self.start_offset + index])
    }

    /// Mutably borrows the element at logical index `index`.
    ///
    /// # Errors
    ///
    /// Fails if `index` is outside `[0, count)`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, BufferError> {
        let count = self.count();
        if index >= count {
            return Err(BufferError::IndexOutOfRange { index, count });
        }
        let start = self.start_offset;
        Ok(&mut self.backing_mut()?[start + index])
    }

    /// The live window as a slice. Empty if no capacity has been set.
    #[must_use]
    pub fn window(&self) -> &[T] {
        match &self.array {
            Some(array) => &array[self.start_offset..self.end_offset],
            None => &[],
        }
    }

    /// The live window as a mutable slice.
    #[must_use]
    pub fn window_mut(&mut self) -> &mut [T] {
        match &mut self.array {
            Some(array) => &mut array[self.start_offset..self.end_offset],
            None => &mut [],
        }
    }

    /// The unused tail `[end_offset, capacity)` as a mutable slice, for
    /// producers to write into.
    ///
    /// # Errors
    ///
    /// Fails if no capacity has been set, or if the tail is empty; callers
    /// must compact or resize first.
    pub fn tail_mut(&mut self) -> Result<&mut [T], BufferError> {
        let end = self.end_offset;
        let array = self.backing_mut()?;
        if end == array.len() {
            return Err(BufferError::NoTailCapacity { capacity: array.len() });
        }
        Ok(&mut array[end..])
    }
}

impl<T> Default for Buffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for Buffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.window()[index]
    }
}

impl<T> IndexMut<usize> for Buffer<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.window_mut()[index]
    }
}

impl<'a, T> IntoIterator for &'a Buffer<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.window().iter()
    }
}
