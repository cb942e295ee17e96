use std::fmt::Debug;

use crate::{DropPolicy, DropPolicyStorage, NoDropPolicy, Sealed};

/// Compile-time policy that decides which lifetime guarantees a container enforces itself and
/// which it leaves to the caller.
///
/// There are exactly three modes, in increasing order of safety and cost:
///
/// * [`Unmanaged`] - no liveness tracking, no automatic destruction, no bounds checks.
///   Element operations are `unsafe` and the caller does all the bookkeeping.
/// * [`Managed`] - one liveness flag per slot. Writes destroy any previous value first, reads
///   of empty slots materialize a default value and the container destroys whatever is still
///   live when it is dropped.
/// * [`ManagedWithBoundsChecks`] - everything [`Managed`] does, plus an explicit index check
///   in front of every operation.
///
/// The mode is a type parameter of the container. All branching on the mode happens on the
/// associated constants below, which are resolved during monomorphization, so a container
/// never pays for the checks of a mode it does not use.
///
/// This trait is sealed; the three modes above are the only implementations.
#[expect(private_bounds, reason = "intentional - sealed trait")]
pub trait ManagementMode: Sealed + Clone + Copy + Debug + Default + Send + Sync + 'static {
    /// Whether the container keeps a liveness flag for each slot.
    const TRACKS_LIVENESS: bool;

    /// Whether every indexed operation validates its index before doing anything else.
    const CHECKS_BOUNDS: bool;

    /// Human-readable name of the mode, used in diagnostics.
    const NAME: &'static str;

    /// Storage for the liveness flags of a container with `CAPACITY` slots.
    ///
    /// Zero-sized for modes that do not track liveness.
    type Flags<const CAPACITY: usize>: LivenessFlags;

    /// Storage for the drop policy of a container.
    ///
    /// Zero-sized for modes that do not track liveness, since they cannot enforce a policy.
    type PolicyStorage: DropPolicyStorage;
}

/// Marker for the modes in which the container tracks the liveness of every slot and can
/// therefore offer a safe element API.
///
/// Implemented by [`Managed`] and [`ManagedWithBoundsChecks`].
pub trait TrackedMode: ManagementMode {}

/// The container manages nothing. See [`ManagementMode`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Unmanaged;

/// The container tracks liveness and destroys values it owns. See [`ManagementMode`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Managed;

/// As [`Managed`], with every index validated before use. See [`ManagementMode`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ManagedWithBoundsChecks;

impl Sealed for Unmanaged {}
impl Sealed for Managed {}
impl Sealed for ManagedWithBoundsChecks {}

impl ManagementMode for Unmanaged {
    const TRACKS_LIVENESS: bool = false;
    const CHECKS_BOUNDS: bool = false;
    const NAME: &'static str = "Unmanaged";

    type Flags<const CAPACITY: usize> = NoLivenessFlags;
    type PolicyStorage = NoDropPolicy;
}

impl ManagementMode for Managed {
    const TRACKS_LIVENESS: bool = true;
    const CHECKS_BOUNDS: bool = false;
    const NAME: &'static str = "Managed";

    type Flags<const CAPACITY: usize> = [bool; CAPACITY];
    type PolicyStorage = DropPolicy;
}

impl ManagementMode for ManagedWithBoundsChecks {
    const TRACKS_LIVENESS: bool = true;
    const CHECKS_BOUNDS: bool = true;
    const NAME: &'static str = "ManagedWithBoundsChecks";

    type Flags<const CAPACITY: usize> = [bool; CAPACITY];
    type PolicyStorage = DropPolicy;
}

impl TrackedMode for Managed {}
impl TrackedMode for ManagedWithBoundsChecks {}

/// Per-slot liveness flags of a container, as selected by [`ManagementMode::Flags`].
///
/// This trait is sealed.
#[expect(private_bounds, reason = "intentional - sealed trait")]
pub trait LivenessFlags: Sealed + Debug + Send + Sync + 'static {
    /// Creates a flag set in which every slot is empty.
    #[must_use]
    fn all_vacant() -> Self;

    /// Returns the flag of slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds (for flag sets that store anything).
    #[must_use]
    fn get(&self, index: usize) -> bool;

    /// Sets the flag of slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds (for flag sets that store anything).
    fn set(&mut self, index: usize, live: bool);
}

impl<const CAPACITY: usize> Sealed for [bool; CAPACITY] {}

impl<const CAPACITY: usize> LivenessFlags for [bool; CAPACITY] {
    fn all_vacant() -> Self {
        [false; CAPACITY]
    }

    fn get(&self, index: usize) -> bool {
        *self.as_slice().get(index).unwrap_or_else(|| {
            panic!("liveness flag {index} out of bounds in container with capacity {CAPACITY}")
        })
    }

    fn set(&mut self, index: usize, live: bool) {
        *self.as_mut_slice().get_mut(index).unwrap_or_else(|| {
            panic!("liveness flag {index} out of bounds in container with capacity {CAPACITY}")
        }) = live;
    }
}

/// The flag set of [`Unmanaged`] containers, which do not track liveness.
///
/// Reports every slot as empty and ignores writes. Occupies no memory.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NoLivenessFlags;

impl Sealed for NoLivenessFlags {}

impl LivenessFlags for NoLivenessFlags {
    fn all_vacant() -> Self {
        Self
    }

    fn get(&self, _index: usize) -> bool {
        false
    }

    fn set(&mut self, _index: usize, _live: bool) {}
}

#[cfg(test)]
mod tests {
    use std::mem;

    use super::*;

    #[test]
    fn modes_increase_in_guarantees() {
        const {
            assert!(!Unmanaged::TRACKS_LIVENESS);
            assert!(!Unmanaged::CHECKS_BOUNDS);
            assert!(Managed::TRACKS_LIVENESS);
            assert!(!Managed::CHECKS_BOUNDS);
            assert!(ManagedWithBoundsChecks::TRACKS_LIVENESS);
            assert!(ManagedWithBoundsChecks::CHECKS_BOUNDS);
        }
    }

    #[test]
    fn unmanaged_flags_occupy_no_memory() {
        assert_eq!(mem::size_of::<<Unmanaged as ManagementMode>::Flags<64>>(), 0);
        assert_eq!(mem::size_of::<<Managed as ManagementMode>::Flags<64>>(), 64);
    }

    #[test]
    fn unmanaged_drop_policy_occupies_no_memory() {
        assert_eq!(mem::size_of::<<Unmanaged as ManagementMode>::PolicyStorage>(), 0);
        assert_eq!(
            mem::size_of::<<Managed as ManagementMode>::PolicyStorage>(),
            mem::size_of::<DropPolicy>()
        );
    }

    #[test]
    fn array_flags_start_vacant() {
        let flags = <[bool; 3]>::all_vacant();

        assert!(!flags.get(0));
        assert!(!flags.get(1));
        assert!(!flags.get(2));
    }

    #[test]
    fn array_flags_remember_writes() {
        let mut flags = <[bool; 3]>::all_vacant();

        flags.set(1, true);

        assert!(!flags.get(0));
        assert!(flags.get(1));
        assert!(!flags.get(2));

        flags.set(1, false);
        assert!(!flags.get(1));
    }

    #[test]
    #[should_panic]
    fn array_flags_get_out_of_bounds_panics() {
        let flags = <[bool; 3]>::all_vacant();
        _ = flags.get(3);
    }

    #[test]
    #[should_panic]
    fn array_flags_set_out_of_bounds_panics() {
        let mut flags = <[bool; 3]>::all_vacant();
        flags.set(3, true);
    }

    #[test]
    fn no_flags_ignore_writes() {
        let mut flags = NoLivenessFlags::all_vacant();

        flags.set(5, true);

        assert!(!flags.get(5));
    }
}
