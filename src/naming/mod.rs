//! Output naming: candidate resolution and per-directory de-duplication.

pub mod registry;
pub mod resolver;
