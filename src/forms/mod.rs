//! HTML form DTOs and their validated payloads.

pub mod import_export;
pub mod products;
pub mod users;
