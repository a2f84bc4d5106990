//! Core data model types for parsed containers and extraction results.

pub mod entry;
