//! Controller layer: UI events, the display state machine, and command orchestration.

pub mod display;
pub mod events;
pub mod orchestration;
