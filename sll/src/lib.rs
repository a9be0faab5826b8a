//! Singly-linked list of `i32` values.
//!
//! Nodes are taken from, and given back to, the [`Allocator`] the list owns, so
//! a failed allocation surfaces as an [`Error`] from [`List::push`] instead of
//! aborting.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::as_conversions)]

mod error;
mod list;
mod node;

pub use error::{Error, Result};
pub use list::{Iter, List};
pub use sll_alloc::{Allocator, Global};
