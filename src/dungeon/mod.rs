//! # Dungeon Data Model
//!
//! The types a generated level is made of: the stamped integer grid,
//! rooms, hallways, doors and keys. Everything here is plain data with
//! id-based cross references; the generation pipeline in
//! [`crate::generation`] builds it, consumers read it.

pub mod door;
pub mod grid;
pub mod hallway;
pub mod room;

pub use door::*;
pub use grid::*;
pub use hallway::*;
pub use room::*;
