//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer takes the projection's rows and cells and turns them into
//! terminal output.  No graph mutation happens here.

pub mod dump;
pub mod layout;
pub mod popup;
pub mod theme;
pub mod tree_widget;
