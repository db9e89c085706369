//! Pedometer gateway interfaces for walkrace
//!
//! This crate defines the boundary between the game core and the step
//! counting sensor. The sensor is a black box that reports cumulative step
//! counts; no step detection happens here.

mod mock;
mod simulated;
mod subscription;
mod traits;

pub use mock::*;
pub use simulated::*;
pub use subscription::*;
pub use traits::*;
