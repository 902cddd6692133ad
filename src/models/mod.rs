//! Data models for the homework tracker.
//!
//! Wire names are camelCase to match the mobile client.

pub mod fields;

mod assignment;
mod contact;
mod points;
mod question;
mod stats;
mod user;

pub use assignment::*;
pub use contact::*;
pub use points::*;
pub use question::*;
pub use stats::*;
pub use user::*;
