//! Core cosmic string network simulation library.
//!
//! Main components:
//! - [`walk`] — random-walk generation of a string's initial shape.
//! - [`worldsheet`] — dense time × point trajectory storage.
//! - [`live_chain`] — per-slice links between live points.
//! - [`phases`] — the update rules applied to one time slice.
//! - [`string`] — strings with fixed ends and their evolution.
//! - [`string_loop`] — closed loops split off from a string.
//! - [`ensemble`] — builds and evolves a batch of strings for rendering.
//! - [`config`] — run configuration and numeric tolerances.
//! - [`lattice`] — lattice moves and first-step velocity tables.
//! - [`error`] — the crate error type.
//! - [`types`] — shared index and seed aliases.

pub mod config;
pub mod ensemble;
pub mod error;
pub mod lattice;
pub mod live_chain;
pub mod phases;
pub mod string;
pub mod string_loop;
pub mod types;
pub mod walk;
pub mod worldsheet;
