//! Game core for walkrace
//!
//! This crate contains:
//! - The session/step store (session lifecycle and step totals)
//! - The permission and availability gate in front of it
//! - Race standings, simulated opponents and chat banter
//! - Session-scoped tick scheduling

mod chat;
mod events;
mod game;
mod gate;
mod opponents;
mod race;
mod schedule;
mod session;
mod session_store;

pub use chat::*;
pub use events::*;
pub use game::*;
pub use gate::*;
pub use opponents::*;
pub use race::*;
pub use schedule::*;
pub use session::*;
pub use session_store::*;
