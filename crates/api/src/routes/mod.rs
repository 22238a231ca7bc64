//! Route handlers

pub mod cameras;
pub mod ptz;
