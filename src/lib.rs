// src/lib.rs
#![crate_type = "lib"]
#![crate_name = "tagmark"]

// Core modules
pub mod application;
pub mod domain;
pub mod infrastructure;

// Ambient modules
pub mod config;
pub mod util;

#[cfg(test)]
mod tests {}
