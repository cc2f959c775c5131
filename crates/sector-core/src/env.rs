//! Environment abstraction for deterministic testing.
//!
//! Decouples chat logic from system resources (time, randomness). Enables
//! deterministic simulation (virtual clock, seeded RNG) and production use
//! with real system resources.

use std::time::Duration;

/// Abstract environment providing time, randomness, and async primitives.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards
/// - `random_bytes()` uses cryptographically secure entropy in production
/// - Methods are infallible except in exceptional circumstances (e.g., OS
///   entropy exhaustion, incorrect simulation setup)
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`, while simulation
    /// environments use virtual time.
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    ///
    /// # Invariants
    ///
    /// - This method MUST return values that never decrease within a single
    ///   execution context.
    fn now(&self) -> Self::Instant;

    /// Wall-clock time in milliseconds since the Unix epoch.
    ///
    /// Used to timestamp outgoing message records. Not monotonic: peers'
    /// clocks disagree, which is why ordering is only a display concern.
    fn wall_clock_millis(&self) -> u64;

    /// Sleeps for the specified duration.
    ///
    /// Only used by driver code, never by chat logic.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same RNG seed, this produces the same sequence of bytes
    /// - Uses cryptographically secure RNG
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }
}

/// Deterministic environment for unit tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        time::Duration,
    };

    use super::Environment;

    /// Wall clock reading at virtual time zero: 2024-11-07T17:20:00Z.
    pub const MOCK_EPOCH_MILLIS: u64 = 1_731_000_000_000;

    /// Mock environment with a manually advanced clock and a counter RNG.
    ///
    /// Clones share the clock and the counter. Not cryptographically random;
    /// never use outside tests.
    #[derive(Clone, Default)]
    pub struct MockEnv {
        elapsed_millis: Arc<AtomicU64>,
        counter: Arc<AtomicU64>,
    }

    impl MockEnv {
        /// Create a mock environment at virtual time zero.
        pub fn new() -> Self {
            Self::default()
        }

        /// Move the clock forward.
        pub fn advance(&self, duration: Duration) {
            let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
            self.elapsed_millis.fetch_add(millis, Ordering::SeqCst);
        }
    }

    impl Environment for MockEnv {
        type Instant = Duration;

        fn now(&self) -> Duration {
            Duration::from_millis(self.elapsed_millis.load(Ordering::SeqCst))
        }

        fn wall_clock_millis(&self) -> u64 {
            MOCK_EPOCH_MILLIS + self.elapsed_millis.load(Ordering::SeqCst)
        }

        fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            self.advance(duration);
            std::future::ready(())
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            for byte in buffer.iter_mut() {
                *byte = self.counter.fetch_add(1, Ordering::SeqCst) as u8;
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn clones_share_the_clock() {
            let env = MockEnv::new();
            let other = env.clone();

            env.advance(Duration::from_secs(2));

            assert_eq!(other.now(), Duration::from_secs(2));
            assert_eq!(other.wall_clock_millis(), MOCK_EPOCH_MILLIS + 2_000);
        }

        #[test]
        fn random_bytes_never_repeat_immediately() {
            let env = MockEnv::new();
            let mut a = [0u8; 8];
            let mut b = [0u8; 8];
            env.random_bytes(&mut a);
            env.random_bytes(&mut b);
            assert_ne!(a, b);
        }
    }
}
