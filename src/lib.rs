//! Seabook: sea service record keeping for maritime cadets.
//!
//! Cadets document onboard training across a fixed set of technical sections.
//! This crate derives each section's completion status from loosely-typed form
//! data, summarizes progress with ship-type applicability in mind, and guards
//! the one-way move from an editable draft to a sealed final record.

pub mod cli;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod schema;
pub mod status;
pub mod storage;
pub mod summary;
#[cfg(test)]
mod testing;
