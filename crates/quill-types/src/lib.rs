//! Foundation types and traits for quill.
//!
//! This crate holds what the console core and its embedders share: key
//! events, the key-source and output-sink traits, configuration and
//! command-definition documents, and error types.

pub mod backend;
pub mod config;
pub mod error;
pub mod input;
