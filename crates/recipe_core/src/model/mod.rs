//! Domain model for accounts, recipes and their attributes.
//!
//! # Responsibility
//! - Define the records core business logic reads and writes.
//! - Own field-level validation so every write path shares one rule set.
//!
//! # Invariants
//! - Recipes, tags and ingredients always belong to exactly one user.
//! - Row identifiers are assigned by storage and never reused.

pub mod attribute;
pub mod banner;
pub mod recipe;
pub mod user;
