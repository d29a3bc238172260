//! Shared reactive state

pub mod observable;

pub use observable::{Derived, Observable, ReadOnly};
