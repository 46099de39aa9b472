//! Core environment context trait for the AvaSim frame loop.

use async_trait::async_trait;
use std::time::{Duration, SystemTime};

/// The clock the frame scheduler runs against.
///
/// This trait abstracts "real time" so the same session code can be driven
/// by the display cadence in production or stepped deterministically in
/// headless runs and tests.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time` and `Instant`
/// - **Simulation**: `SimContext` (in `avasim_sim`) - a virtual clock that
///   only moves when the scheduler sleeps
#[async_trait]
pub trait AvasimContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// The path animator measures segment progress against this value.
    fn now(&self) -> Duration;

    /// Returns the wall-clock time, used only for export metadata.
    fn system_time(&self) -> SystemTime;

    /// Suspends until the next frame is due.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances the virtual clock
    async fn sleep(&self, duration: Duration);

    /// Returns true if time only advances through `sleep`.
    fn is_virtual(&self) -> bool {
        false
    }
}
