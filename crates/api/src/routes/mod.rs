//! Route handlers

pub mod admin;
pub mod health;
pub mod monitoring;
pub mod predictions;
