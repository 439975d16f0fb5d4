//! Snapshot stores and the algorithms that keep them consistent.
//!
//! # Responsibility
//! - `tag_store`: case-insensitive index, validation, tag mutations.
//! - `tag_matcher`: filter + free-text resolution of narrative tags.
//! - `narrative_store`: timeline insertion and narrative mutations.
//!
//! # Invariants
//! - Every function here is pure over the data it is given: no clock reads,
//!   no randomness except through an injected `IdGenerator`, no I/O.

pub mod narrative_store;
pub mod tag_matcher;
pub mod tag_store;
