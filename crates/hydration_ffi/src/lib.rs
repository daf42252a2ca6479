//! Flutter bridge crate for the hydration tracker.

pub mod api;
