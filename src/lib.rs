//! Browse an RDF graph as a collapsible tree with predicate columns.
//!
//! [`core`] holds the graph store, the column registry and the tree
//! projection and has no terminal dependencies.  [`ui`] and [`app`] build
//! the interactive viewer on top of it.

pub mod app;
pub mod config;
pub mod core;
pub mod ui;
