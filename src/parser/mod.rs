//! Container parsing: marker search, layout detection, and payload decoding.

pub mod container;
pub mod matcher;
pub mod text;
