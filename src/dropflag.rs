//! This module is for testing only

use std::rc::Rc;
use std::cell::RefCell;

pub type DropFlag<T> = Rc<RefCell<T>>;

/// Counts how many times values sharing the same flag were dropped.
#[derive(Debug)]
pub struct Counted {
    pub value: i32,
    pub dropflag: DropFlag<usize>,
}

impl Counted {
    pub fn new(value: i32, dropflag: &DropFlag<usize>) -> Counted {
        Counted { value, dropflag: dropflag.clone() }
    }
}

impl Clone for Counted {
    fn clone(&self) -> Self {
        Counted::new(self.value, &self.dropflag)
    }
}

impl PartialEq for Counted {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Drop for Counted {
    fn drop(&mut self) {
        *self.dropflag.borrow_mut() += 1;
    }
}

/// Neither `Clone` nor `Default`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct MoveOnly(pub Box<i32>);

impl MoveOnly {
    pub fn new(value: i32) -> MoveOnly {
        MoveOnly(Box::new(value))
    }
}

pub fn counter() -> DropFlag<usize> {
    DropFlag::new(RefCell::new(0))
}

#[test]
fn dropflag() {
    let flag = counter();
    let a = Counted::new(1, &flag);
    let b = a.clone();
    assert_eq!(0, *flag.borrow());
    std::mem::drop(a);
    assert_eq!(1, *flag.borrow());
    std::mem::drop(b);
    assert_eq!(2, *flag.borrow());
}
