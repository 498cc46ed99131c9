//! Catalog data model.

pub mod entity;
pub mod kind;

pub use entity::{NewProblem, Problem, Sheet, SubPattern, Topic};
pub use kind::{EntityKind, Platform};
