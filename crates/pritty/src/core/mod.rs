//! Core sync logic - no browser dependencies.
//!
//! Everything here works against the capability traits in [`host`]. The
//! rendered page is the only source of truth: nothing in this module caches
//! viewed state, every aggregate is recomputed from what is currently
//! queryable.
//!
//! # Module Structure
//!
//! - `host`: capability traits the page adapter implements
//! - `item`: typed `Leaf | Group` view over tree nodes
//! - `path`: logical path resolution from identity hints
//! - `locate`: content region / viewed toggle lookup
//! - `tristate`: unchecked / checked / mixed aggregation
//! - `viewed`: bulk viewed-state snapshot used for seeding
//! - `subscription`: cancellation handles and the expiring watch primitive
//! - `page`: pull request page detection

pub mod error;
pub mod host;
pub mod item;
pub mod locate;
pub mod page;
pub mod path;
pub mod subscription;
pub mod tristate;
pub mod viewed;
