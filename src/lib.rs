//! Polls remote log groups for new records, normalizes them into events and
//! pushes them downstream, keeping a per-group resume cursor on disk.

pub mod api;
pub mod cli;
pub mod config;
pub mod engine;
pub mod event;
pub mod metadata;
pub mod position;
pub mod sink;
pub mod source;
