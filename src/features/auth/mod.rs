//! Authentication feature: login, self-registration and the token/guard
//! machinery used by every protected route.

pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use services::{AuthService, TokenService};
