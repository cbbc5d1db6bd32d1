//! Core algorithms – graph access, column registry, and the tree projection.
//!
//! Nothing in this module depends on any TUI or rendering crate.

pub mod columns;
pub mod error;
pub mod format;
pub mod graph;
pub mod model;
pub mod ntriples;
pub mod projection;
pub mod term;
