//! Public API module.
//!
//! This module contains the high-level user-facing API for the `mmrs` crate.

pub mod firmware_settings;
pub mod hooks;
pub mod modem_manager;
pub mod models;
pub mod service;
pub mod signal;
