//! Core data types for condor.
//!
//! This crate defines the declarative inputs the resolver consumes: artifact
//! keys, ordered versions, module and union declarations, the descriptor
//! file that carries them, and the global user configuration.
//!
//! This crate is intentionally free of resolution logic.

pub mod artifact;
pub mod config;
pub mod declaration;
pub mod descriptor;
pub mod version;
