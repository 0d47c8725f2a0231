//! Seams to the presentation layer.
//!
//! The GUI toolkit is not part of this crate. It plugs in through [`Notifier`] and
//! [`SavePathPicker`], and drives user actions through [`FleetActions`].

pub mod actions;
pub mod collaborators;

pub use actions::FleetActions;
pub use collaborators::{Notifier, SavePathPicker};
