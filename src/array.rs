use crate::{HeapVecError, IntoIter, OwnedBuffer, RawBlock};
use crate::buffer::alloc_failure;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::slice::SliceIndex;

/// Request to create an empty `DynamicArray` with preallocated capacity.
///
/// Keeps "reserve `n` slots" apart from "create `n` default elements":
/// `DynamicArray::from(reserve(10))` has length 0 and capacity 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReserveCapacity(pub usize);

/// Shorthand for `ReserveCapacity(capacity)`.
pub fn reserve(capacity: usize) -> ReserveCapacity {
    ReserveCapacity(capacity)
}

/// Growable array stored in a single `RawBlock`.
///
/// Slots `[0, len)` hold the elements, slots `[len, capacity)` are uninitialized.
/// When the array is full, `push` and `insert` double the capacity (an empty array grows to 1).
///
/// Any reference or slice obtained from the array is invalidated by an operation that
/// reallocates: `push` or `insert` at full capacity, and `reserve` or `resize` beyond it.
/// The borrow checker enforces this for safe code; positions that must survive such calls
/// should be kept as indices.
pub struct DynamicArray<T> {
    buffer: RawBlock<T>,
    len: usize,
}

impl<T> DynamicArray<T> {
    pub const fn new() -> DynamicArray<T> {
        DynamicArray {
            buffer: RawBlock::empty(),
            len: 0,
        }
    }

    /// Exactly `capacity` slots. Zero capacity does not allocate.
    pub fn with_capacity(capacity: usize) -> DynamicArray<T> {
        let mut array = DynamicArray::new();
        array.reserve(capacity);
        array
    }

    pub fn with_len(len: usize) -> DynamicArray<T> where T: Default {
        DynamicArray {
            buffer: OwnedBuffer::with_default(len).into_block(),
            len,
        }
    }

    pub fn from_value(len: usize, value: &T) -> DynamicArray<T> where T: Clone {
        DynamicArray {
            buffer: OwnedBuffer::filled(len, value).into_block(),
            len,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buffer.slots()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.buffer.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.buffer.as_mut_ptr(), self.len) }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Returns the element at `index`, or `OutOfRange` if `index >= len`.
    pub fn at(&self, index: usize) -> Result<&T, HeapVecError> {
        if index >= self.len {
            return Err(HeapVecError::OutOfRange { index, len: self.len });
        }
        Ok(unsafe { self.buffer.get_unchecked(index) })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, HeapVecError> {
        if index >= self.len {
            return Err(HeapVecError::OutOfRange { index, len: self.len });
        }
        Ok(unsafe { self.buffer.get_unchecked_mut(index) })
    }

    /// Keeps the capacity.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drops the elements past `new_len`. Does nothing if `new_len >= len`.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let old_len = self.len;
        // shorten first, so a panicking drop can not expose dropped slots
        self.len = new_len;
        unsafe { self.buffer.drop_range(new_len, old_len) };
    }

    /// Changes the length to `new_len`.
    ///
    /// Shrinking drops the tail and keeps the capacity. Growing within capacity fills the new
    /// slots with `T::default()`; growing beyond it reallocates to exactly `new_len` slots first.
    pub fn resize(&mut self, new_len: usize) where T: Default {
        if let Err(e) = self.try_resize(new_len) {
            alloc_failure::<T>(e);
        }
    }

    /// On failure the array is left unchanged.
    pub fn try_resize(&mut self, new_len: usize) -> Result<(), HeapVecError> where T: Default {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }

        if new_len > self.capacity() {
            self.try_reallocate(new_len)?;
        }

        while self.len < new_len {
            unsafe { self.buffer.write(self.len, T::default()) };
            self.len += 1;
        }
        Ok(())
    }

    /// Makes sure the capacity is at least `new_capacity`.
    ///
    /// Unlike `Vec::reserve`, the argument is the total capacity, not the additional one.
    /// If the array has to grow, the new buffer has exactly `new_capacity` slots.
    pub fn reserve(&mut self, new_capacity: usize) {
        if let Err(e) = self.try_reserve(new_capacity) {
            alloc_failure::<T>(e);
        }
    }

    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), HeapVecError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        self.try_reallocate(new_capacity)
    }

    /// Appends `value`, doubling the capacity if the array is full.
    pub fn push(&mut self, value: T) {
        if let Err(e) = self.try_push(value) {
            alloc_failure::<T>(e);
        }
    }

    /// On failure `value` is dropped and the array is left unchanged.
    pub fn try_push(&mut self, value: T) -> Result<(), HeapVecError> {
        self.try_grow_by(1)?;
        unsafe { self.buffer.write(self.len, value) };
        self.len += 1;
        Ok(())
    }

    /// Inserts `value` at `index`, moving the elements after it one slot to the right,
    /// and returns the inserted element.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        match self.try_insert(index, value) {
            Ok(inserted) => inserted,
            Err(e @ HeapVecError::OutOfRange { .. }) => panic!("insert: {}", e),
            Err(e) => alloc_failure::<T>(e),
        }
    }

    /// On failure `value` is dropped and the array is left unchanged.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<&mut T, HeapVecError> {
        if index > self.len {
            return Err(HeapVecError::OutOfRange { index, len: self.len });
        }
        self.try_grow_by(1)?;

        unsafe {
            self.buffer.shift_right(index, self.len);
            self.buffer.write(index, value);
        }
        self.len += 1;
        Ok(unsafe { self.buffer.get_unchecked_mut(index) })
    }

    /// Removes and returns the element at `index`, moving the elements after it one slot left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        match self.try_remove(index) {
            Ok(removed) => removed,
            Err(e) => panic!("remove: {}", e),
        }
    }

    pub fn try_remove(&mut self, index: usize) -> Result<T, HeapVecError> {
        if index >= self.len {
            return Err(HeapVecError::OutOfRange { index, len: self.len });
        }
        unsafe {
            let removed = self.buffer.read(index);
            self.buffer.shift_left(index, self.len);
            self.len -= 1;
            Ok(removed)
        }
    }

    /// Drops the element at `index` and returns the element that took its place,
    /// or `None` if the last element was erased.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) -> Option<&mut T> {
        std::mem::drop(self.remove(index));
        self.as_mut_slice().get_mut(index)
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { self.buffer.read(self.len) })
    }

    pub fn swap_with(&mut self, other: &mut DynamicArray<T>) {
        self.buffer.swap(&mut other.buffer);
        std::mem::swap(&mut self.len, &mut other.len);
    }

    /// Leaves this array with zero length and zero capacity.
    pub fn take(&mut self) -> DynamicArray<T> {
        std::mem::replace(self, DynamicArray::new())
    }

    /// Makes room for `additional` more elements, doubling the capacity or growing to the exact
    /// requirement if doubling is not enough. Does nothing if they already fit.
    fn try_grow_by(&mut self, additional: usize) -> Result<(), HeapVecError> {
        let required = self.len.checked_add(additional)
            .ok_or(HeapVecError::CapacityOverflow { requested: usize::MAX })?;
        if required <= self.capacity() {
            return Ok(());
        }
        self.try_reallocate(grown_capacity(self.capacity(), required))
    }

    /// Allocates a buffer of `new_capacity` slots, moves the elements into it and frees the old one.
    fn try_reallocate(&mut self, new_capacity: usize) -> Result<(), HeapVecError> {
        debug_assert!(new_capacity >= self.len, "reallocation keeps all elements");
        let mut buffer = RawBlock::try_uninit(new_capacity)?;
        debug!("reallocate {} -> {} slots, moving {} elements", self.capacity(), new_capacity, self.len);
        unsafe { self.buffer.move_prefix_into(self.len, &mut buffer) };
        self.buffer.swap(&mut buffer);
        // the old block is released when `buffer` goes out of scope
        Ok(())
    }
}

/// Capacity after growing from `current` to hold `required` slots: double the current
/// capacity (an empty buffer grows to 1), or `required` if doubling is not enough.
/// Saturates at `usize::MAX`, which the allocator then reports as `CapacityOverflow`.
fn grown_capacity(current: usize, required: usize) -> usize {
    let doubled = if current == 0 { 1 } else { current.saturating_mul(2) };
    doubled.max(required)
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        let len = self.len;
        self.len = 0;
        unsafe { self.buffer.drop_range(0, len) };
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        DynamicArray::new()
    }
}

impl<T> Clone for DynamicArray<T> where T: Clone {
    /// Copies the elements into a buffer of exactly `len` slots.
    fn clone(&self) -> Self {
        DynamicArray {
            buffer: OwnedBuffer::from_slice(self.as_slice()).into_block(),
            len: self.len,
        }
    }
}

impl<T> From<ReserveCapacity> for DynamicArray<T> {
    fn from(request: ReserveCapacity) -> Self {
        DynamicArray::with_capacity(request.0)
    }
}

impl<T, const N: usize> From<[T; N]> for DynamicArray<T> {
    fn from(values: [T; N]) -> Self {
        DynamicArray {
            buffer: OwnedBuffer::from(values).into_block(),
            len: N,
        }
    }
}

impl<T> From<&[T]> for DynamicArray<T> where T: Clone {
    fn from(values: &[T]) -> Self {
        DynamicArray {
            buffer: OwnedBuffer::from_slice(values).into_block(),
            len: values.len(),
        }
    }
}

impl<T> From<Vec<T>> for DynamicArray<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T> std::iter::FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item=T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut array = DynamicArray::with_capacity(lower);
        for item in iter {
            array.push(item);
        }
        array
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item=T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if let Err(e) = self.try_grow_by(lower) {
            alloc_failure::<T>(e);
        }
        for item in iter {
            self.push(item);
        }
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> IntoIter<T> {
        let len = std::mem::replace(&mut self.len, 0);
        IntoIter {
            buffer: self.buffer.take(),
            front: 0,
            back: len,
        }
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for DynamicArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for DynamicArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, I: SliceIndex<[T]>> Index<I> for DynamicArray<T> {
    type Output = I::Output;

    #[inline(always)]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, I: SliceIndex<[T]>> IndexMut<I> for DynamicArray<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<T, U> PartialEq<DynamicArray<U>> for DynamicArray<T> where T: PartialEq<U> {
    fn eq(&self, other: &DynamicArray<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, U, const N: usize> PartialEq<[U; N]> for DynamicArray<T> where T: PartialEq<U> {
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == &other[..]
    }
}

impl<T, U> PartialEq<[U]> for DynamicArray<T> where T: PartialEq<U> {
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T> Eq for DynamicArray<T> where T: Eq {}

/// Lexicographic over the elements; a proper prefix orders before the longer array.
impl<T> PartialOrd for DynamicArray<T> where T: PartialOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T> Ord for DynamicArray<T> where T: Ord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T> Hash for DynamicArray<T> where T: Hash {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl<T> std::fmt::Debug for DynamicArray<T> where T: std::fmt::Debug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
