//! Program effectiveness analytics and student data management for
//! multi-tenant education providers.

pub mod analytics;
pub mod catalog;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod telemetry;
