//! Data Transfer Objects for response serialization.

pub mod health;
