use std::time::Duration;

use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
/// All energy (joules) and power (watts) values in the engine use this type.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Simulation ticks per second.
pub const TICKS_PER_SECOND: u32 = 20;

/// Wall-clock duration of one tick at 20 ticks per second.
pub const TICK_DURATION: Duration = Duration::from_millis(50);

/// Convert a power rate in watts to this tick's joule budget.
/// At 20 ticks/second: 1 W = 0.05 J/tick.
#[inline]
pub fn watts_to_joules_per_tick(watts: Fixed64) -> Fixed64 {
    watts / Fixed64::from_num(TICKS_PER_SECOND)
}

/// Convert a per-tick joule amount back to a rate in watts.
#[inline]
pub fn joules_per_tick_to_watts(joules_per_tick: Fixed64) -> Fixed64 {
    joules_per_tick * Fixed64::from_num(TICKS_PER_SECOND)
}

/// Convert an f64 to Fixed64. Use only for initialization, never in sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display/FFI, never in sim loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Format a power value for display, e.g. "100.0 W", "1.50 kW", "2.30 MW".
pub fn format_power(watts: Fixed64) -> String {
    let w = fixed64_to_f64(watts);
    if w >= 1_000_000.0 {
        format!("{:.2} MW", w / 1_000_000.0)
    } else if w >= 1_000.0 {
        format!("{:.2} kW", w / 1_000.0)
    } else {
        format!("{w:.1} W")
    }
}

/// Format an energy value for display, e.g. "100.0 J", "1.50 kJ", "2.30 MJ".
pub fn format_energy(joules: Fixed64) -> String {
    let j = fixed64_to_f64(joules);
    if j >= 1_000_000.0 {
        format!("{:.2} MJ", j / 1_000_000.0)
    } else if j >= 1_000.0 {
        format!("{:.2} kJ", j / 1_000.0)
    } else {
        format!("{j:.1} J")
    }
}
