//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: no domain transforms.

pub mod logs;
pub mod tables;

pub use logs::LogFollower;
pub use tables::{print_list, print_separator, truncate_string};
