//! Catalog data models

pub mod vehicle;

pub use vehicle::Vehicle;
