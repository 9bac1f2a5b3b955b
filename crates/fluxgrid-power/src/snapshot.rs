//! Per-tick distribution results and point-in-time network summaries.

use fluxgrid_core::fixed::{fixed64_to_f64, format_energy, format_power, Fixed64};
use fluxgrid_core::id::NetworkId;
use fluxgrid_core::pos::BlockPos;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Tick stats
// ---------------------------------------------------------------------------

/// Energy accounting for one network over one tick. All values in joules,
/// except `satisfaction` which is a ratio in [0, 1].
///
/// Conservation holds every tick:
/// `produced + discharged == consumed + charged + wasted`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickStats {
    /// Joules injected by producers this tick.
    pub produced: Fixed64,
    /// Joules accepted by consumers this tick.
    pub consumed: Fixed64,
    /// Joules banked into storage this tick.
    pub charged: Fixed64,
    /// Joules drawn from storage this tick.
    pub discharged: Fixed64,
    /// Joules produced but neither consumed nor stored. Gone for good.
    pub wasted: Fixed64,
    /// Fraction of demand that could be met: 0..1.
    pub satisfaction: Fixed64,
}

impl Default for TickStats {
    /// The stats of an idle tick: nothing moved, demand trivially met.
    fn default() -> Self {
        Self {
            produced: Fixed64::ZERO,
            consumed: Fixed64::ZERO,
            charged: Fixed64::ZERO,
            discharged: Fixed64::ZERO,
            wasted: Fixed64::ZERO,
            satisfaction: Fixed64::ONE,
        }
    }
}

impl TickStats {
    /// Whether demand outstripped supply this tick.
    pub fn had_deficit(&self) -> bool {
        self.satisfaction < Fixed64::ONE
    }

    /// Whether production exceeded what consumers took this tick.
    pub fn had_surplus(&self) -> bool {
        self.charged > Fixed64::ZERO || self.wasted > Fixed64::ZERO
    }
}

impl std::fmt::Display for TickStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "produced {} consumed {} charged {} discharged {} wasted {} satisfaction {:.2}",
            format_energy(self.produced),
            format_energy(self.consumed),
            format_energy(self.charged),
            format_energy(self.discharged),
            format_energy(self.wasted),
            fixed64_to_f64(self.satisfaction),
        )
    }
}

// ---------------------------------------------------------------------------
// Network snapshot
// ---------------------------------------------------------------------------

/// A point-in-time summary of one network, safe to hand to observers.
/// Rates are in watts, energies in joules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub id: NetworkId,
    /// Every member position, in roster (sorted) order.
    pub member_positions: Vec<BlockPos>,
    pub producer_count: usize,
    pub consumer_count: usize,
    pub storage_count: usize,
    pub conduit_count: usize,
    /// Sum of producer current rates.
    pub total_production_rate: Fixed64,
    /// Sum of consumption rates over consumers that can operate.
    pub total_consumption_rate: Fixed64,
    pub total_stored_energy: Fixed64,
    pub total_storage_capacity: Fixed64,
}

impl NetworkSnapshot {
    pub fn member_count(&self) -> usize {
        self.member_positions.len()
    }

    /// Production minus demand, in watts. Negative means a deficit.
    pub fn net_power_balance(&self) -> Fixed64 {
        self.total_production_rate - self.total_consumption_rate
    }

    /// How long stored energy would cover current demand, in seconds.
    /// `None` when there is no demand to cover.
    pub fn storage_runtime_secs(&self) -> Option<Fixed64> {
        if self.total_consumption_rate > Fixed64::ZERO {
            Some(self.total_stored_energy / self.total_consumption_rate)
        } else {
            None
        }
    }
}

impl std::fmt::Display for NetworkSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} nodes, {} / {} demand, {} / {} stored",
            self.id,
            self.member_count(),
            format_power(self.total_production_rate),
            format_power(self.total_consumption_rate),
            format_energy(self.total_stored_energy),
            format_energy(self.total_storage_capacity),
        )
    }
}
