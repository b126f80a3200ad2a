//! Person registry feature.
//!
//! CRUD over registered persons with role-based access: ADMIN and MODERATOR
//! may read, only ADMIN may write. Passwords are argon2-hashed on the way in
//! and never serialized on the way out.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::PersonService;
