//! Linked lists.
//!
//! - [`typed`]: a lock-guarded singly linked list that owns its elements and
//!   can be shared between threads.
pub mod typed;
