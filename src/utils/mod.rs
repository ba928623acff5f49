//! Utility modules for the build engine.

pub mod slug;
pub mod url;
