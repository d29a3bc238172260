//! Catalog data types

pub mod character;

pub use character::{ApiResponse, Character, CharacterSet, LocationRef, PageInfo};
