//! HSP: Hospital Staff Portal
//!
//! A Unix-style toolkit for managing hospital records - patients, staff,
//! credentials, billing, and clinical notes - as plain text files under
//! git version control.

pub mod cli;
pub mod core;
pub mod entities;
pub mod registration;
pub mod schema;
pub mod yaml;
