//! API handlers module

pub mod blog;
pub mod demo;
pub mod health;
