//! Type definitions and constants.
//!
//! This module contains ModemManager constants.

pub mod constants;
