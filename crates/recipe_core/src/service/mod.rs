//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the HTTP layer decoupled from storage details.

pub mod attribute_service;
pub mod banner_service;
pub mod recipe_service;
pub mod user_service;
