//! Fluxgrid Core -- shared data types for the Fluxgrid power engine.
//!
//! This crate provides the value types and the node capability model the
//! rest of the workspace builds on:
//!
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic
//!   energy arithmetic; all joule/watt values in the engine use it.
//! - [`pos::BlockPos`] -- integer 3D world position with the fixed
//!   6-neighbor (face) adjacency relation.
//! - [`id::NetworkId`] -- identifier for one power network, handed out by
//!   [`id::NetworkIdAllocator`].
//! - [`node::PowerNode`] -- the trait every grid participant implements,
//!   plus the [`node::Producer`], [`node::Consumer`], [`node::Storage`],
//!   and [`node::Conduit`] capability traits. Capability presence is
//!   queried through accessor methods, never through concrete types.
//! - [`record::NodeRecord`] -- the flat string-keyed scalar record a node
//!   reduces to for persistence. The encoding on disk is the host's
//!   business; network membership is never persisted.

pub mod fixed;
pub mod id;
pub mod node;
pub mod pos;
pub mod record;
