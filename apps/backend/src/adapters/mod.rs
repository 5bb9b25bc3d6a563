//! Storage adapters implementing [`crate::repos::WalkStore`].

pub mod memory;
