//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use sector_core::NamespacePath;
use sector_sync::{ItemId, SyncItem};

use crate::App;

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal and in simulation.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, an in-process sync engine
/// - **Simulation**: scripted events and a shared in-memory engine
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Poll for the next input event.
    ///
    /// Returns an event or `None` if no events are ready.
    fn poll_event(
        &mut self,
    ) -> impl Future<Output = Result<Option<crate::AppEvent>, Self::Error>> + Send;

    /// Subscribe to a namespace. Items from it are returned by
    /// [`Driver::recv_item`] from now on, backlog first.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync engine refuses the subscription.
    fn bind(&mut self, path: &NamespacePath) -> Result<(), Self::Error>;

    /// Append a value to a namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync engine rejects the write.
    fn append(&mut self, path: &NamespacePath, value: Vec<u8>) -> Result<ItemId, Self::Error>;

    /// Next item from the bound namespace.
    ///
    /// Returns `None` if nothing is ready or nothing is bound. Must not wait
    /// for new items.
    fn recv_item(&mut self) -> impl Future<Output = Option<SyncItem>> + Send;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Release the subscription and clean up resources.
    fn stop(&mut self);
}
