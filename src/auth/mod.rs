//! # Auth Module
//!
//! Local credential authentication, OAuth login for Google and Facebook, and
//! user persistence.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod service;
pub mod store;


pub use routes::auth_routes;
