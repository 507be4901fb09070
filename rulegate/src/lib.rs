// rulegate/src/lib.rs
//! # Rulegate CLI Application
//!
//! This crate provides the command-line front end for `rulegate-core` and
//! `rulegate-fuzzy`: banned-word screening, pattern inspection, and schema
//! validation of JSON documents.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
