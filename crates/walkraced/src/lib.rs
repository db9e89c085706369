//! Building blocks of the walkraced service
//!
//! The binary wires these together with the game core:
//! - Console commands read from stdin
//! - Translation of core events into API events for the presentation layer

mod console;
mod publish;

pub use console::*;
pub use publish::*;
