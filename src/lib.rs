//! Chat widget - embeddable assistant chat panel with safe markdown-lite
//! rendering and transcript state.

pub mod cli;
pub mod client;
pub mod config;
pub mod id;
pub mod render;
pub mod transcript;
pub mod view;
