//! Worker side of the UI/backend split: a thread hosting async timeline fetches.

pub mod commands;
pub mod runtime;
