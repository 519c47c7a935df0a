//! Build driver for primerbook.
//!
//! Ties chapter discovery, markdown conversion, and output assembly into the
//! `build` and `check` workflows.

pub mod assembler;
pub mod discovery;
pub mod pipeline;
