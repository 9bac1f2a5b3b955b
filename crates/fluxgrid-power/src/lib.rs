//! Power Networks Module for the Fluxgrid engine.
//!
//! Maintains the partition of placed nodes into connected power networks
//! and balances energy across each network once per tick. Each tick the
//! module surveys production and demand, computes a satisfaction ratio
//! (0..1 as [`Fixed64`](fluxgrid_core::fixed::Fixed64)), settles the
//! surplus or deficit against storage, and reports per-network
//! [`TickStats`](snapshot::TickStats).
//!
//! # Design
//!
//! - Nodes are owned by the [`manager::PowerNetworkManager`] and keyed by
//!   position; networks hold member position rosters, never nodes.
//! - Placing a node merges every distinct adjacent network into one;
//!   removing a node splits its network into connected components.
//! - Connectivity is face adjacency plus explicit conduit links, walked
//!   symmetrically.
//! - Distribution is deterministic: fixed-point arithmetic and stable
//!   iteration order, so replaying the same operations gives the same
//!   numbers.
//! - Observers subscribe through [`listener::NetworkListener`]; callbacks
//!   run on the tick thread and must return quickly.

pub mod listener;
pub mod manager;
pub mod network;
pub mod snapshot;
pub mod ticker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
