//! Province reference data.
//!
//! Middle of the geographic hierarchy. A province belongs to a country and
//! is identified by its coordinates; creating at an existing location hands
//! back the existing row.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ProvinceService;
