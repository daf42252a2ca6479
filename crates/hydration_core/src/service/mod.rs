//! Core use-case services.
//!
//! # Responsibility
//! - Own the in-memory hydration state and every transition on it.
//! - Keep UI/FFI layers decoupled from storage keys and encodings.

pub mod hydration_service;
