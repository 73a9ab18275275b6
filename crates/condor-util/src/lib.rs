//! Shared utilities for condor.
//!
//! This crate provides the cross-cutting error type used by the descriptor,
//! config and CLI layers. Resolution failures themselves are structured
//! values defined next to the algorithms in `condor-resolver`.

pub mod errors;
