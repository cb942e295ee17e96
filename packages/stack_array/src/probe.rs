//! Instrumented element types for observing when a container constructs, clones and destroys
//! its elements.
//!
//! A [`Probe`] wraps a value and reports each of its lifetime events to a [`LifetimeObserver`].
//! Observers shipped with the crate:
//!
//! * [`ThreadCounter`] - tallies events in thread-local counters;
//! * [`SharedCounter`] - tallies events in counters shared by every clone of the handle;
//! * [`TraceObserver`] - emits a `tracing` event for each lifetime event.
//!
//! # Examples
//!
//! ```
//! use stack_array::{ElementLifetime, ManagedStackArray, Probe, SharedCounter};
//!
//! let counter = SharedCounter::new();
//!
//! {
//!     let mut array = ManagedStackArray::<Probe<u32, SharedCounter>, 4>::new();
//!
//!     array.move_to(0, Probe::new(1, counter.clone()));
//!     array.move_to(0, Probe::new(2, counter.clone()));
//!
//!     // The first value was destroyed when it was overwritten.
//!     assert_eq!(counter.counts().dropped(), 1);
//! }
//!
//! // The second value was destroyed when the array was dropped.
//! assert_eq!(counter.counts().dropped(), 2);
//! assert_eq!(counter.counts().alive(), 0);
//! ```

use std::any::type_name;
use std::cell::Cell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use tracing::trace;

/// Something that happened to a [`Probe`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum LifetimeEvent {
    /// A probe was created from a value.
    Constructed,

    /// A probe was created by cloning another probe.
    Cloned,

    /// A probe was dropped.
    Dropped,
}

/// Receives the lifetime events of a [`Probe`].
pub trait LifetimeObserver {
    /// Called once for every event, after construction and before destruction.
    fn observe(&self, event: LifetimeEvent);
}

/// Tallies of lifetime events.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LifetimeCounts {
    constructed: usize,
    cloned: usize,
    dropped: usize,
}

impl LifetimeCounts {
    /// Counts in which nothing has happened yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            constructed: 0,
            cloned: 0,
            dropped: 0,
        }
    }

    /// Number of probes created from a value.
    #[must_use]
    pub const fn constructed(&self) -> usize {
        self.constructed
    }

    /// Number of probes created by cloning.
    #[must_use]
    pub const fn cloned(&self) -> usize {
        self.cloned
    }

    /// Number of probes dropped.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// Number of probes created (by construction or cloning) and not yet dropped.
    #[must_use]
    pub const fn alive(&self) -> usize {
        self.constructed
            .saturating_add(self.cloned)
            .saturating_sub(self.dropped)
    }

    #[must_use]
    const fn record(mut self, event: LifetimeEvent) -> Self {
        match event {
            LifetimeEvent::Constructed => self.constructed = self.constructed.saturating_add(1),
            LifetimeEvent::Cloned => self.cloned = self.cloned.saturating_add(1),
            LifetimeEvent::Dropped => self.dropped = self.dropped.saturating_add(1),
        }

        self
    }
}

thread_local! {
    static THREAD_COUNTS: Cell<LifetimeCounts> = const { Cell::new(LifetimeCounts::new()) };
}

/// Tallies lifetime events in counters local to the current thread.
///
/// The counters are shared by every probe on the thread that uses this observer, so tests that
/// rely on them should [`reset()`][Self::reset] them first.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ThreadCounter;

impl ThreadCounter {
    /// Returns the counts recorded on the current thread.
    #[must_use]
    pub fn counts() -> LifetimeCounts {
        THREAD_COUNTS.with(Cell::get)
    }

    /// Resets the counts of the current thread to zero.
    pub fn reset() {
        THREAD_COUNTS.with(|counts| counts.set(LifetimeCounts::new()));
    }
}

impl LifetimeObserver for ThreadCounter {
    fn observe(&self, event: LifetimeEvent) {
        THREAD_COUNTS.with(|counts| counts.set(counts.get().record(event)));
    }
}

/// Tallies lifetime events in counters shared by every clone of this handle.
///
/// Not thread-safe; probes using it cannot leave the thread they were created on.
#[derive(Clone, Debug, Default)]
pub struct SharedCounter {
    counts: Rc<Cell<LifetimeCounts>>,
}

impl SharedCounter {
    /// Creates a handle to a new set of counters, all zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the counts recorded so far.
    #[must_use]
    pub fn counts(&self) -> LifetimeCounts {
        self.counts.get()
    }
}

impl LifetimeObserver for SharedCounter {
    fn observe(&self, event: LifetimeEvent) {
        self.counts.set(self.counts.get().record(event));
    }
}

/// Emits a `tracing` event at trace level for every lifetime event.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TraceObserver;

impl LifetimeObserver for TraceObserver {
    #[cfg_attr(test, mutants::skip)] // Only produces log output.
    fn observe(&self, event: LifetimeEvent) {
        trace!(?event, "probe lifetime event");
    }
}

/// A value that reports its construction, cloning and destruction to an observer.
///
/// Dereferences to the wrapped value. Equality compares the wrapped values only.
pub struct Probe<V, O: LifetimeObserver = ThreadCounter> {
    value: V,
    observer: O,
}

impl<V, O: LifetimeObserver> Probe<V, O> {
    /// Wraps `value`, reporting [`LifetimeEvent::Constructed`] to `observer`.
    #[must_use]
    pub fn new(value: V, observer: O) -> Self {
        observer.observe(LifetimeEvent::Constructed);

        Self { value, observer }
    }

    /// The wrapped value.
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The wrapped value, for modification.
    #[must_use]
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// The observer that receives the events of this probe.
    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }
}

impl<V> Probe<V, ThreadCounter> {
    /// Wraps `value`, counting its events with the [`ThreadCounter`] of the current thread.
    #[must_use]
    pub fn counted(value: V) -> Self {
        Self::new(value, ThreadCounter)
    }
}

impl<V: Default, O: LifetimeObserver + Default> Default for Probe<V, O> {
    fn default() -> Self {
        Self::new(V::default(), O::default())
    }
}

impl<V: Clone, O: LifetimeObserver + Clone> Clone for Probe<V, O> {
    fn clone(&self) -> Self {
        let observer = self.observer.clone();
        observer.observe(LifetimeEvent::Cloned);

        Self {
            value: self.value.clone(),
            observer,
        }
    }
}

impl<V, O: LifetimeObserver> Drop for Probe<V, O> {
    fn drop(&mut self) {
        self.observer.observe(LifetimeEvent::Dropped);
    }
}

impl<V, O: LifetimeObserver> Deref for Probe<V, O> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.value
    }
}

impl<V, O: LifetimeObserver> DerefMut for Probe<V, O> {
    fn deref_mut(&mut self) -> &mut V {
        &mut self.value
    }
}

impl<V: PartialEq, O: LifetimeObserver> PartialEq for Probe<V, O> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<V: Eq, O: LifetimeObserver> Eq for Probe<V, O> {}

impl<V: fmt::Debug, O: LifetimeObserver> fmt::Debug for Probe<V, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe")
            .field("value", &self.value)
            .field("observer_type", &format_args!("{}", type_name::<O>()))
            .finish()
    }
}
