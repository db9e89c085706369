//! Presentation-facing types for walkrace
//!
//! This crate defines what the core hands to whatever renders the game:
//! - Derived views (session, players, daily goal)
//! - Notices and chat lines
//! - Events (core -> presentation)
//! - Versioning

mod events;
mod types;

pub use events::*;
pub use types::*;

/// Current API version
pub const API_VERSION: u32 = 1;
