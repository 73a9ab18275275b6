//! Resolution engine: conditional module activation over a possibly cyclic
//! module graph, capability uniqueness, and union/member selection from an
//! element catalog.
//!
//! Both resolutions are pure functions of their declarative input.

pub mod activation;
pub mod ambiguity;
pub mod capability;
pub mod catalog;
pub mod error;
pub mod graph;
pub mod selector;
