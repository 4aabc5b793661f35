//! Tether World
//!
//! In-memory native store. Implements every boundary trait from
//! `tether_core::native`, so the scripting layer can run against it
//! directly.
//!
//! - Entity table with a parent/child tree
//! - One component table per `ComponentType`, each its own handle space
//! - Transform hierarchy, rigid-body integration, raycasts
//! - Assets, input and the diagnostics sink

mod assets;
mod input;
mod physics;
mod records;
mod table;
mod transform;
mod world;

pub use world::{Diagnostic, World};
