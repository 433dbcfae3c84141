//! Music Catalog Library
//!
//! This library exposes modules for the server binary and integration testing

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;
pub mod test_utils;
pub mod validation;
