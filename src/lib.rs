//! `cafemsg` — extract localized text from `.msg` message containers.
//!
//! This crate provides the core library for parsing the two known container
//! layouts, resolving collision-free entry names, and writing each entry as
//! a UTF-8 text file grouped by language and category.

pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod naming;
pub mod parser;
