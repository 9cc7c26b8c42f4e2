pub mod action;
pub mod color;
pub mod config;
pub mod duration;
pub mod style;
pub mod testing;

#[cfg(test)]
mod testutil;

pub use crate::config::Config;
