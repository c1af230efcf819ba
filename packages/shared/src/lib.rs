//! Utilities shared between the Kakehashi packages.

pub mod logger;
pub mod time;
