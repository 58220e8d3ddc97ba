//! Engine for rectangular panel cutting.
//!
//! Contains the data model of a cutlist (parts, stock sheets, placements and layouts),
//! the free-rectangle geometry, a single-sheet guillotine packer, lamination expansion
//! and the external (JSON) representation of instances and solutions.

pub mod entities;
pub mod geometry;
pub mod io;
pub mod lamination;
pub mod packing;
pub mod util;
