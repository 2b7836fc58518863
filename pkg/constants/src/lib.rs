//! Centralized constants for the corral control plane.
//!
//! All project-wide constant values live here.
//! Change a value in one place and it applies everywhere.

pub mod network;
pub mod paths;
pub mod project;
pub mod state;
