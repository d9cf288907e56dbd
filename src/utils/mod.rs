//! # Utilities Module
//!
//! Integer-grid geometry shared by the data model and every generation
//! stage.

pub mod math;

pub use math::*;
