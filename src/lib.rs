/*!

Growable array on top of an exclusively owned heap buffer.

`OwnedBuffer` owns one heap block of initialized values and is only ever moved, swapped
or released. `RawBlock` is the same block without the values, for code that tracks which
slots are live on its own.
`DynamicArray` keeps a length on top of it, doubles the buffer when it runs out of
space and moves elements between blocks on reallocation.

```
use heapvec::{DynamicArray, HeapVecError};

let mut array = DynamicArray::new();
array.push(1);
array.push(2);
array.push(3);
array.insert(0, 9);
array.erase(2);
assert_eq!(array, [9, 1, 3]);
assert_eq!(Err(HeapVecError::OutOfRange { index: 5, len: 3 }), array.at(5));
```

Enable the `logging` feature to trace allocations through the `log` crate.

*/

mod logging;
mod error;
mod buffer;
mod array;
mod iter;

pub use error::HeapVecError;
pub use buffer::{OwnedBuffer, RawBlock};
pub use array::{DynamicArray, ReserveCapacity, reserve};
pub use iter::IntoIter;

#[cfg(test)]
pub mod dropflag;
