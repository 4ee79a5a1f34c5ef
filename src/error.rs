use std::fmt::Display;

/// Errors reported by `OwnedBuffer` and `DynamicArray`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapVecError {
    /// Checked access with an index that is not below the array length.
    OutOfRange { index: usize, len: usize },
    /// The byte size of the requested slot count does not fit into `isize::MAX`.
    CapacityOverflow { requested: usize },
    /// The allocator could not provide memory for the requested slot count.
    AllocFailed { requested: usize },
}

impl HeapVecError {
    /// Returns true for the errors caused by failed or impossible allocation.
    pub fn is_alloc_error(&self) -> bool {
        match self {
            HeapVecError::OutOfRange { .. } => false,
            HeapVecError::CapacityOverflow { .. } | HeapVecError::AllocFailed { .. } => true,
        }
    }
}

impl Display for HeapVecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeapVecError::OutOfRange { index, len } => write!(f, "index {} is out of range for array of length {}", index, len),
            HeapVecError::CapacityOverflow { requested } => write!(f, "capacity overflow while allocating {} slots", requested),
            HeapVecError::AllocFailed { requested } => write!(f, "memory allocation of {} slots failed", requested),
        }
    }
}

impl std::error::Error for HeapVecError {}

#[cfg(test)]
mod error_tests {
    use crate::HeapVecError;

    #[test]
    fn out_of_range_message_names_index_and_len() {
        let e = HeapVecError::OutOfRange { index: 5, len: 2 };
        assert_eq!("index 5 is out of range for array of length 2", e.to_string());
        assert!(!e.is_alloc_error());
    }

    #[test]
    fn alloc_errors_are_flagged() {
        assert!(HeapVecError::CapacityOverflow { requested: usize::MAX }.is_alloc_error());
        assert!(HeapVecError::AllocFailed { requested: 8 }.is_alloc_error());
        assert_eq!("memory allocation of 8 slots failed", HeapVecError::AllocFailed { requested: 8 }.to_string());
    }
}
