//! Data types shared across the heritage library.

pub mod config;
pub mod filter;
pub mod geo;
pub mod site;
