//! Command handlers.
//!
//! Handlers are thin: they translate arguments into coordinator or client
//! calls and format the results for the terminal.

pub mod catalog;
pub mod pythons;
pub mod say;
pub mod serve;
pub mod status;
