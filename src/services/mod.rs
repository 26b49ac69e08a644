//! Service layer: storage, assembly, and the access gate.

pub mod assembly;
pub mod auth;
pub mod component;
pub mod prompt;
