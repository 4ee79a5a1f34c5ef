use crate::HeapVecError;
use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

/// Heap block of uninitialized `T` slots with exactly one owner.
///
/// Dropping the block deallocates it, but never drops slot contents: whoever writes
/// values into the slots drops them with `drop_range`.
pub struct RawBlock<T> {
    ptr: Option<NonNull<T>>,
    slots: usize,
    _owns: PhantomData<T>,
}

impl<T> RawBlock<T> {
    pub const fn empty() -> RawBlock<T> {
        RawBlock {
            ptr: None,
            slots: 0,
            _owns: PhantomData,
        }
    }

    fn layout_for(slots: usize) -> Result<Layout, HeapVecError> {
        Layout::array::<T>(slots).map_err(|_| HeapVecError::CapacityOverflow { requested: slots })
    }

    /// Zero slots yield the empty block.
    pub fn try_uninit(slots: usize) -> Result<RawBlock<T>, HeapVecError> {
        if slots == 0 {
            return Ok(RawBlock::empty());
        }

        let layout = Self::layout_for(slots)?;
        if layout.size() == 0 {
            return Ok(RawBlock {
                ptr: Some(NonNull::dangling()),
                slots,
                _owns: PhantomData,
            });
        }

        let raw = unsafe { alloc::alloc(layout) } as *mut T;
        let ptr = NonNull::new(raw).ok_or(HeapVecError::AllocFailed { requested: slots })?;
        trace!("allocate {} slots ({} bytes)", slots, layout.size());

        Ok(RawBlock {
            ptr: Some(ptr),
            slots,
            _owns: PhantomData,
        })
    }

    /// Panics on capacity overflow, aborts through `handle_alloc_error` if the allocator fails.
    pub fn uninit(slots: usize) -> RawBlock<T> {
        match Self::try_uninit(slots) {
            Ok(block) => block,
            Err(e) => alloc_failure::<T>(e),
        }
    }

    /// # Safety
    ///
    /// `ptr` and `slots` must be the pair returned by `release`, owned by nothing else.
    pub unsafe fn from_raw_parts(ptr: NonNull<T>, slots: usize) -> RawBlock<T> {
        RawBlock {
            ptr: Some(ptr),
            slots,
            _owns: PhantomData,
        }
    }

    #[must_use]
    pub fn release(&mut self) -> Option<(NonNull<T>, usize)> {
        let ptr = self.ptr.take()?;
        Some((ptr, mem::replace(&mut self.slots, 0)))
    }

    pub fn take(&mut self) -> RawBlock<T> {
        mem::replace(self, RawBlock::empty())
    }

    pub fn swap(&mut self, other: &mut RawBlock<T>) {
        mem::swap(self, other);
    }

    #[inline(always)]
    pub fn is_allocated(&self) -> bool {
        self.ptr.is_some()
    }

    #[inline(always)]
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Never null: the empty block returns a dangling, well aligned pointer.
    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.unwrap_or_else(NonNull::dangling).as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.unwrap_or_else(NonNull::dangling).as_ptr()
    }

    /// # Safety
    ///
    /// `index < slots()` and the slot is initialized.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.slots, "get_unchecked: index < slots");
        &*self.as_ptr().add(index)
    }

    /// # Safety
    ///
    /// `index < slots()` and the slot is initialized.
    #[inline(always)]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.slots, "get_unchecked_mut: index < slots");
        &mut *self.as_mut_ptr().add(index)
    }

    /// Does not drop what was in the slot.
    ///
    /// # Safety
    ///
    /// `index < slots()`.
    #[inline(always)]
    pub unsafe fn write(&mut self, index: usize, value: T) {
        debug_assert!(index < self.slots, "write: index < slots");
        ptr::write(self.as_mut_ptr().add(index), value);
    }

    /// # Safety
    ///
    /// `index < slots()` and the slot is initialized; it is uninitialized afterwards.
    #[inline(always)]
    pub unsafe fn read(&mut self, index: usize) -> T {
        debug_assert!(index < self.slots, "read: index < slots");
        ptr::read(self.as_ptr().add(index))
    }

    /// # Safety
    ///
    /// `start <= end <= slots()` and every slot in the range is initialized.
    pub unsafe fn drop_range(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end && end <= self.slots, "drop_range: start <= end <= slots");
        let first = self.as_mut_ptr().add(start);
        ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, end - start));
    }

    /// Moves slots `[0, count)` into the front of `target`.
    ///
    /// # Safety
    ///
    /// `count` fits both blocks, source slots are initialized and target slots hold nothing to drop.
    pub unsafe fn move_prefix_into(&mut self, count: usize, target: &mut RawBlock<T>) {
        debug_assert!(count <= self.slots && count <= target.slots, "move_prefix_into: count fits");
        ptr::copy_nonoverlapping(self.as_ptr(), target.as_mut_ptr(), count);
    }

    /// Moves `[index, end)` one slot right, leaving `index` uninitialized.
    ///
    /// # Safety
    ///
    /// `index <= end < slots()` and `[index, end)` is initialized.
    pub unsafe fn shift_right(&mut self, index: usize, end: usize) {
        debug_assert!(index <= end && end < self.slots, "shift_right: index <= end < slots");
        let at = self.as_mut_ptr().add(index);
        ptr::copy(at, at.add(1), end - index);
    }

    /// Moves `(index, end)` one slot left over the already read-out `index`.
    ///
    /// # Safety
    ///
    /// `index < end <= slots()`, `index` is uninitialized and `(index, end)` initialized.
    /// Slot `end - 1` is uninitialized afterwards.
    pub unsafe fn shift_left(&mut self, index: usize, end: usize) {
        debug_assert!(index < end && end <= self.slots, "shift_left: index < end <= slots");
        let at = self.as_mut_ptr().add(index);
        ptr::copy(at.add(1), at, end - index - 1);
    }
}

impl<T> Default for RawBlock<T> {
    fn default() -> Self {
        RawBlock::empty()
    }
}

impl<T> std::fmt::Debug for RawBlock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBlock")
            .field("ptr", &self.ptr)
            .field("slots", &self.slots)
            .finish()
    }
}

impl<T> Drop for RawBlock<T> {
    fn drop(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            let layout = Layout::array::<T>(self.slots).expect("layout was valid at allocation");
            if layout.size() != 0 {
                trace!("deallocate {} slots", self.slots);
                unsafe { alloc::dealloc(ptr.as_ptr() as *mut u8, layout) };
            }
        }
    }
}

/// Contiguous heap block of initialized `T` values with exactly one owner.
///
/// Every slot holds a value. Dropping the buffer drops all of them and deallocates the
/// block once. The buffer can be moved, swapped or `release`d, but never duplicated:
///
/// ```compile_fail
/// use heapvec::OwnedBuffer;
///
/// fn duplicate<T: Clone>(value: &T) -> T { value.clone() }
///
/// let buffer = OwnedBuffer::filled(4, &1u8);
/// let copy = duplicate(&buffer);
/// ```
pub struct OwnedBuffer<T> {
    block: RawBlock<T>,
}

impl<T> OwnedBuffer<T> {
    pub const fn empty() -> OwnedBuffer<T> {
        OwnedBuffer { block: RawBlock::empty() }
    }

    /// `len` slots set to `T::default()`. Zero yields the empty buffer.
    pub fn with_default(len: usize) -> OwnedBuffer<T> where T: Default {
        let mut block = RawBlock::uninit(len);
        for index in 0..len {
            unsafe { block.write(index, T::default()) };
        }
        OwnedBuffer { block }
    }

    pub fn filled(len: usize, value: &T) -> OwnedBuffer<T> where T: Clone {
        let mut block = RawBlock::uninit(len);
        for index in 0..len {
            unsafe { block.write(index, value.clone()) };
        }
        OwnedBuffer { block }
    }

    pub fn from_slice(values: &[T]) -> OwnedBuffer<T> where T: Clone {
        let mut block = RawBlock::uninit(values.len());
        for (index, value) in values.iter().enumerate() {
            unsafe { block.write(index, value.clone()) };
        }
        OwnedBuffer { block }
    }

    /// # Safety
    ///
    /// `ptr` and `slots` must be the pair returned by `release`, owned by nothing else,
    /// with every slot still initialized.
    pub unsafe fn from_raw_parts(ptr: NonNull<T>, slots: usize) -> OwnedBuffer<T> {
        OwnedBuffer { block: RawBlock::from_raw_parts(ptr, slots) }
    }

    /// Gives up the block and its values and leaves this buffer empty. Hand the pair back to
    /// `from_raw_parts` to have the values dropped and the block deallocated.
    #[must_use]
    pub fn release(&mut self) -> Option<(NonNull<T>, usize)> {
        self.block.release()
    }

    /// Hands the initialized slots over to a `RawBlock`; the caller drops them from now on.
    pub fn into_block(mut self) -> RawBlock<T> {
        self.block.take()
    }

    pub fn take(&mut self) -> OwnedBuffer<T> {
        mem::replace(self, OwnedBuffer::empty())
    }

    pub fn swap(&mut self, other: &mut OwnedBuffer<T>) {
        self.block.swap(&mut other.block);
    }

    #[inline(always)]
    pub fn is_allocated(&self) -> bool {
        self.block.is_allocated()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.block.slots()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.block.slots() == 0
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.block.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.block.as_mut_ptr()
    }

    /// # Safety
    ///
    /// `index < len()`.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        self.block.get_unchecked(index)
    }

    /// # Safety
    ///
    /// `index < len()`.
    #[inline(always)]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        self.block.get_unchecked_mut(index)
    }

    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.block.as_ptr(), self.block.slots()) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.block.as_mut_ptr(), self.block.slots()) }
    }
}

impl<T, const N: usize> From<[T; N]> for OwnedBuffer<T> {
    fn from(values: [T; N]) -> Self {
        let mut block = RawBlock::uninit(N);
        for (index, value) in IntoIterator::into_iter(values).enumerate() {
            unsafe { block.write(index, value) };
        }
        OwnedBuffer { block }
    }
}

impl<T> Default for OwnedBuffer<T> {
    fn default() -> Self {
        OwnedBuffer::empty()
    }
}

impl<T> std::fmt::Debug for OwnedBuffer<T> where T: std::fmt::Debug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice().iter()).finish()
    }
}

impl<T> Drop for OwnedBuffer<T> {
    fn drop(&mut self) {
        let slots = self.block.slots();
        unsafe { self.block.drop_range(0, slots) };
    }
}

/// Turns an allocation error into the same panic or abort `Vec` would produce.
pub(crate) fn alloc_failure<T>(e: HeapVecError) -> ! {
    match e {
        HeapVecError::AllocFailed { requested } => match Layout::array::<T>(requested) {
            Ok(layout) => alloc::handle_alloc_error(layout),
            Err(_) => panic!("{}", e),
        },
        _ => panic!("{}", e),
    }
}
