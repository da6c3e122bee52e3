//! HTTP route handlers

pub mod health;
pub mod invocations;
pub mod records;
