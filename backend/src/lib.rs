//! eNote library
//!
//! Multi-user note service core: accounts and sessions, plus categories,
//! tags and notes that are only ever visible to the user who owns them.

pub mod access;
pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod paging;
pub mod responses;
pub mod services;
pub mod validation;

#[cfg(test)]
mod testing;
