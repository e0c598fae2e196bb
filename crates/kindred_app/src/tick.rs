//! Fixed-timestep tick loop.
//!
//! Each tick hands the elapsed time to a [`BehaviourSystem`], which updates
//! every wrapped entity once.

use std::time::{Duration, Instant};

use kindred_binding::{BehaviourSystem, BindError};
use tracing::{debug, info, warn};

/// Errors that stop the tick loop.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TickError {
    /// The tick rate does not give a positive, representable tick length.
    #[error("invalid tick rate {0}: expected a positive number of ticks per second")]
    InvalidTickRate(f64),

    /// An entity update failed.
    #[error(transparent)]
    Update(#[from] BindError),
}

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl TickConfig {
    /// Length of one tick at the configured rate.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::InvalidTickRate`] unless the rate is finite,
    /// positive, and large enough for its tick to fit in a [`Duration`].
    pub fn tick_duration(&self) -> Result<Duration, TickError> {
        tick_duration(self.tick_rate)
    }
}

fn tick_duration(tick_rate: f64) -> Result<Duration, TickError> {
    if !tick_rate.is_finite() || tick_rate <= 0.0 {
        return Err(TickError::InvalidTickRate(tick_rate));
    }
    Duration::try_from_secs_f64(tick_rate.recip())
        .map_err(|_| TickError::InvalidTickRate(tick_rate))
}

/// Parse a `--tick-rate` argument, rejecting rates the loop cannot run at.
///
/// # Errors
///
/// Returns a message for clap when the value is not a usable rate.
pub fn parse_tick_rate(value: &str) -> Result<f64, String> {
    let rate: f64 = value.parse().map_err(|e| format!("{e}"))?;
    tick_duration(rate).map_err(|e| e.to_string())?;
    Ok(rate)
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

/// The tick loop state.
#[derive(Debug)]
pub struct TickLoop<'w> {
    /// Current tick counter.
    tick_id: u64,
    /// Tick configuration.
    config: TickConfig,
    /// Entities updated every tick.
    system: BehaviourSystem<'w>,
}

impl<'w> TickLoop<'w> {
    /// Create a new tick loop driving `system`.
    #[must_use]
    pub fn new(config: TickConfig, system: BehaviourSystem<'w>) -> Self {
        Self {
            tick_id: 0,
            config,
            system,
        }
    }

    /// Returns the current tick counter.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// Returns a reference to the driven system.
    #[must_use]
    pub fn system(&self) -> &BehaviourSystem<'w> {
        &self.system
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns the first entity update failure.
    pub fn tick(&mut self, dt: f64) -> Result<(), BindError> {
        self.tick_id += 1;
        debug!(
            tick_id = self.tick_id,
            dt,
            entities = self.system.len(),
            "tick start"
        );
        self.system.update(dt)
    }

    /// Run the tick loop for the configured number of ticks, or indefinitely.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::InvalidTickRate`] before the first tick if the
    /// configured rate is unusable, and stops at the first tick that fails.
    pub fn run(&mut self) -> Result<(), TickError> {
        let tick_duration = self.config.tick_duration()?;
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            self.tick(tick_duration.as_secs_f64())?;

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "tick loop complete");
                return Ok(());
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
    }
}
