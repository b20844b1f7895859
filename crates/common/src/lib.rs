//! Pieces shared by every service crate: logging setup and small wire types.

pub mod types;
pub mod utils;
