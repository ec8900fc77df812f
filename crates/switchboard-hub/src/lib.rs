//! # Switchboard Hub
//!
//! The command boundary around the registry core: wire shapes the
//! presentation layer speaks, the HTTP surface hosting the commands,
//! and the glue that feeds lifecycle changes to a connector
//! supervisor.

pub mod api;
pub mod supervisor;
pub mod wire;
