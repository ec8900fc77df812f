//! # Switchboard Core
//!
//! Records, validation, lifecycle, and the registry store for the
//! Switchboard integration backend. This crate is the foundation;
//! the hub and CLI build on it.

pub mod error;
pub mod event;
pub mod lifecycle;
pub mod persist;
pub mod record;
pub mod registry;
pub mod store;
pub mod validate;
