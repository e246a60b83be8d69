//! Thread-safe collections that own their elements.
//!
//! The centerpiece is [`TypedList`](linked_list::typed::TypedList), a
//! singly linked list guarded by a single lock, meant to be shared between
//! threads as a plain container. With the `std` feature enabled, the
//! [`runner`] module can run a shell command and collect its output into such
//! a list, one entry per line.
//!
//! ```
//! use mola_typed_list::prelude::*;
//!
//! let list = TypedList::<u32>::new().unwrap();
//! list.append(1).unwrap();
//! list.append(2).unwrap();
//! list.prepend(0).unwrap();
//!
//! assert_eq!(list.len(), 3);
//! assert_eq!(list.head(false).unwrap(), 0);
//! assert_eq!(list.tail(true).unwrap(), 2);
//! assert_eq!(list.snapshot().unwrap(), vec![0, 1]);
//! ```
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod error;
pub mod linked_list;

#[cfg(feature = "std")]
pub mod runner;

#[cfg(test)]
mod test_util;

pub mod prelude {
    pub use crate::error::{ListError, LockError};
    pub use crate::linked_list::typed::{TypedList, TypedListBuilder};

    #[cfg(feature = "std")]
    pub use crate::error::RunnerError;
    #[cfg(feature = "std")]
    pub use crate::runner::{RunReport, Runner};
}
