//! HTTP handlers

pub mod health;
pub mod layout;
pub mod predict;
