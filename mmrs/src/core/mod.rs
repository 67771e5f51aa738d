//! Core internal logic for the extended signal interface.
//!
//! This module contains the refresh scheduler, the snapshot store and the
//! client-side reads used by the public API.

pub(crate) mod firmware;
pub(crate) mod refresh;
pub(crate) mod signal_reader;
pub(crate) mod snapshot;

#[cfg(test)]
pub(crate) mod testing;
