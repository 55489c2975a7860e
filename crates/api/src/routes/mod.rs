//! Route handlers

pub mod camera;
pub mod chat;
pub mod health;
pub mod motivation;
pub mod settings;
pub mod speech;
pub mod stress;
