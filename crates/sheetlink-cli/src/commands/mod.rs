//! Command handlers

pub mod build;
pub mod catalog;
pub mod config;
