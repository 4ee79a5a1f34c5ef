use crate::RawBlock;
use std::iter::FusedIterator;

/// By-value iterator over the live elements of a `DynamicArray`.
///
/// Slots `[front, back)` hold the elements not yet yielded. Dropping the iterator drops
/// them and then releases the buffer.
pub struct IntoIter<T> {
    pub (crate) buffer: RawBlock<T>,
    pub (crate) front: usize,
    pub (crate) back: usize,
}

impl<T> IntoIter<T> {
    /// The elements that have not been yielded yet.
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.buffer.as_ptr().add(self.front), self.back - self.front) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let item = unsafe { self.buffer.read(self.front) };
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(unsafe { self.buffer.read(self.back) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.back - self.front
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> std::fmt::Debug for IntoIter<T> where T: std::fmt::Debug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let (front, back) = (self.front, self.back);
        self.front = back;
        unsafe { self.buffer.drop_range(front, back) };
    }
}
