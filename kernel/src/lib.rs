//! Chroma Kernel: the problem model and proof primitives shared by every crate.
//!
//! # API Surface
//!
//! - [`graph::AdjacencyV1`] -- ordered adjacency lists (node order is search order)
//! - [`palette::PaletteV1`] -- ordered color labels (label order is try order)
//! - [`assignment::AssignmentV1`] -- commit-ordered partial coloring
//! - [`proof`] -- canonical JSON, domain-separated hashing, problem digests
//!
//! # Module Dependency Direction
//!
//! `graph`, `palette`, `assignment` ← `proof`
//!
//! One-way only. The model modules depend on nothing internal.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod assignment;
pub mod graph;
pub mod palette;
pub mod proof;
