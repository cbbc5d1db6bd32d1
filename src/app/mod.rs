//! Application orchestration: state and input handling.

pub mod event;
pub mod handler;
pub mod sample;
pub mod state;
