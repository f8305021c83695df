//! Modules layer - Infrastructure components
//!
//! Contains adapters that sit below the feature layer, like the in-process
//! event bus.

pub mod events;
