//! Math utilities for the IMX185 core.
//!
//! This module provides the fixed-point value domain shared by every control.

pub mod fixed_point;
