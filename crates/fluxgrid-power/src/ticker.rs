//! Drives the manager at a fixed 20 Hz cadence from a dedicated thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use fluxgrid_core::fixed::TICK_DURATION;

use crate::manager::PowerNetworkManager;

// ---------------------------------------------------------------------------
// Ticker stats
// ---------------------------------------------------------------------------

/// Timing accumulated over the ticker's lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickerStats {
    pub tick_count: u64,
    pub total_time: Duration,
    pub min_time: Duration,
    pub max_time: Duration,
}

impl TickerStats {
    fn record(&mut self, elapsed: Duration) {
        if self.tick_count == 0 || elapsed < self.min_time {
            self.min_time = elapsed;
        }
        if elapsed > self.max_time {
            self.max_time = elapsed;
        }
        self.tick_count += 1;
        self.total_time += elapsed;
    }

    pub fn average_time(&self) -> Duration {
        if self.tick_count > 0 {
            self.total_time / self.tick_count as u32
        } else {
            Duration::ZERO
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ticks, avg {:?}, min {:?}, max {:?}",
            self.tick_count,
            self.average_time(),
            self.min_time,
            self.max_time,
        )
    }
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Fires `tick_all` on a shared manager once per [`TICK_DURATION`].
///
/// The manager lock is held only for the duration of each tick, so hosts
/// may register and query between ticks. `stop` is cooperative: it takes
/// effect at the next firing boundary, never mid-tick.
pub struct PowerTicker {
    manager: Arc<Mutex<PowerNetworkManager>>,
    running: Arc<AtomicBool>,
    stats: TickerStats,
}

impl PowerTicker {
    pub fn new(manager: Arc<Mutex<PowerNetworkManager>>) -> Self {
        Self {
            manager,
            running: Arc::new(AtomicBool::new(true)),
            stats: TickerStats::default(),
        }
    }

    /// Fire a single tick, if still running. Returns whether it fired.
    pub fn run_once(&mut self) -> bool {
        if !self.running.load(Ordering::SeqCst) {
            return false;
        }
        let started = Instant::now();
        {
            // A panic while ticking poisons the lock but the manager
            // itself is still usable; recover and carry on.
            let mut manager = match self.manager.lock() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    log::warn!("power manager lock poisoned, recovering");
                    poisoned.into_inner()
                }
            };
            manager.tick_all();
        }
        self.stats.record(started.elapsed());
        true
    }

    /// Ask the ticker to stop at the next firing boundary.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> TickerStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = TickerStats::default();
    }

    /// Move the ticker onto its own thread, firing every [`TICK_DURATION`].
    /// Ticks that run long are not made up; the cadence just slips.
    pub fn spawn(mut self) -> TickerHandle {
        let running = Arc::clone(&self.running);
        let handle = thread::spawn(move || {
            while self.running.load(Ordering::SeqCst) {
                let started = Instant::now();
                self.run_once();
                let elapsed = started.elapsed();
                thread::sleep(TICK_DURATION.saturating_sub(elapsed));
            }
            self
        });
        TickerHandle { running, handle }
    }
}

/// Handle to a spawned ticker thread.
pub struct TickerHandle {
    running: Arc<AtomicBool>,
    handle: JoinHandle<PowerTicker>,
}

impl TickerHandle {
    /// Stop the thread and get the ticker (and its stats) back. If the
    /// thread itself panicked, a fresh stopped ticker cannot be recovered,
    /// so this returns `None`.
    pub fn stop(self) -> Option<PowerTicker> {
        self.running.store(false, Ordering::SeqCst);
        self.handle.join().ok()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FixedConsumer, FixedProducer};
    use fluxgrid_core::fixed::Fixed64;
    use fluxgrid_core::pos::BlockPos;

    fn fixed(v: f64) -> Fixed64 {
        Fixed64::from_num(v)
    }

    fn shared_manager() -> Arc<Mutex<PowerNetworkManager>> {
        let mut manager = PowerNetworkManager::new();
        manager
            .register(Box::new(FixedProducer::new(BlockPos::new(0, 0, 0), fixed(400.0))))
            .ok()
            .unwrap();
        manager
            .register(Box::new(FixedConsumer::new(BlockPos::new(1, 0, 0), fixed(160.0))))
            .ok()
            .unwrap();
        Arc::new(Mutex::new(manager))
    }

    // -----------------------------------------------------------------------
    // Test 1: run_once ticks the manager and records timing
    // -----------------------------------------------------------------------
    #[test]
    fn run_once_ticks_and_records() {
        let manager = shared_manager();
        let mut ticker = PowerTicker::new(Arc::clone(&manager));

        assert!(ticker.run_once());
        assert_eq!(ticker.stats().tick_count, 1);

        let guard = manager.lock().unwrap();
        let id = guard.network_at(BlockPos::new(0, 0, 0)).unwrap();
        assert_eq!(guard.network_stats(id).unwrap().produced, fixed(20.0));
    }

    // -----------------------------------------------------------------------
    // Test 2: stop takes effect at the next firing boundary
    // -----------------------------------------------------------------------
    #[test]
    fn stop_prevents_further_ticks() {
        let manager = shared_manager();
        let mut ticker = PowerTicker::new(manager);

        assert!(ticker.run_once());
        ticker.stop();
        assert!(!ticker.is_running());
        assert!(!ticker.run_once());
        assert_eq!(ticker.stats().tick_count, 1);
    }

    // -----------------------------------------------------------------------
    // Test 3: spawned ticker runs on its own thread and stops cleanly
    // -----------------------------------------------------------------------
    #[test]
    fn spawned_ticker_runs_and_stops() {
        let manager = shared_manager();
        let ticker = PowerTicker::new(Arc::clone(&manager));
        let handle = ticker.spawn();

        // A few cadence periods is plenty for at least one tick.
        thread::sleep(TICK_DURATION * 4);
        let ticker = handle.stop().unwrap();
        assert!(ticker.stats().tick_count >= 1);

        let guard = manager.lock().unwrap();
        let id = guard.network_at(BlockPos::new(0, 0, 0)).unwrap();
        assert!(guard.network_stats(id).unwrap().produced > Fixed64::ZERO);
    }

    // -----------------------------------------------------------------------
    // Test 4: stats aggregate across ticks
    // -----------------------------------------------------------------------
    #[test]
    fn stats_aggregate() {
        let manager = shared_manager();
        let mut ticker = PowerTicker::new(manager);

        for _ in 0..3 {
            ticker.run_once();
        }
        let stats = ticker.stats();
        assert_eq!(stats.tick_count, 3);
        assert!(stats.min_time <= stats.max_time);
        assert!(stats.total_time >= stats.max_time);
        assert!(!stats.summary().is_empty());

        ticker.reset_stats();
        assert_eq!(ticker.stats().tick_count, 0);
    }
}
