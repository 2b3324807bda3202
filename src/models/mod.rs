//! Diesel row models and their domain conversions.

pub mod brand;
pub mod config;
pub mod order;
pub mod product;
pub mod user;
