use std::any::type_name;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::{fmt, thread};

use crate::{
    DropPolicy, DropPolicyStorage, ElementLifetime, LivenessFlags, Managed,
    ManagedWithBoundsChecks, ManagementMode, SlotStorage, StackArrayBuilder, TrackedMode,
    Unmanaged, UseDefault, slot,
};

/// A fixed-capacity array of `CAPACITY` slots stored inline, in which elements are constructed
/// and destroyed only when the caller asks for it.
///
/// Creating a `StackArray` does not construct any elements - every slot starts out empty. The
/// element operations come from the element lifetime interface, which is selected by the
/// management mode `M`:
///
/// * [`Managed`] (the default) and [`ManagedWithBoundsChecks`] get the safe
///   [`ElementLifetime`] operations. The array keeps one liveness flag per slot and destroys
///   whatever is still live when it is dropped.
/// * [`Unmanaged`] gets the `unsafe` [`RawElementLifetime`][crate::RawElementLifetime]
///   operations. The array keeps no flags, never destroys anything by itself and leaves the
///   bookkeeping to the caller.
///
/// `D` is the [default-construction policy][crate::DefaultFactory], used when an element has to
/// be materialized without a caller-supplied value.
///
/// The aliases [`UnmanagedStackArray`], [`ManagedStackArray`] and [`SafeStackArray`] name the
/// three modes more briefly.
///
/// # Capacity
///
/// The capacity is part of the type and never changes. A zero capacity is rejected at compile
/// time when the array is constructed.
///
/// # Cloning
///
/// In tracked modes, cloning produces a new array with a clone of every live element in the
/// same slot, and the same drop policy. Unmanaged arrays cannot be cloned because they do not
/// know which slots are live.
///
/// # Thread safety
///
/// The array performs no synchronization. It is `Send` and `Sync` whenever `T` is.
///
/// # Examples
///
/// ```
/// use stack_array::{ElementLifetime, StackArray};
///
/// let mut array = StackArray::<Vec<u8>, 8>::new();
///
/// array.move_to(3, vec![1, 2, 3]);
/// array.ref_from(3).push(4);
///
/// assert_eq!(array.const_ref_from(3), &[1, 2, 3, 4]);
/// assert_eq!(array.live_count(), 1);
///
/// // The remaining live element is destroyed when the array is dropped.
/// ```
pub struct StackArray<T, const CAPACITY: usize, M: ManagementMode = Managed, D = UseDefault> {
    slots: [MaybeUninit<T>; CAPACITY],

    /// One flag per slot in tracked modes, zero-sized otherwise.
    flags: M::Flags<CAPACITY>,

    /// The drop policy in tracked modes, zero-sized otherwise.
    drop_policy: M::PolicyStorage,

    _defaults: PhantomData<fn() -> D>,
}

/// A [`StackArray`] in [`Unmanaged`] mode.
pub type UnmanagedStackArray<T, const CAPACITY: usize, D = UseDefault> =
    StackArray<T, CAPACITY, Unmanaged, D>;

/// A [`StackArray`] in [`Managed`] mode.
pub type ManagedStackArray<T, const CAPACITY: usize, D = UseDefault> =
    StackArray<T, CAPACITY, Managed, D>;

/// A [`StackArray`] in [`ManagedWithBoundsChecks`] mode.
pub type SafeStackArray<T, const CAPACITY: usize, D = UseDefault> =
    StackArray<T, CAPACITY, ManagedWithBoundsChecks, D>;

impl<T, const CAPACITY: usize, M: ManagementMode, D> StackArray<T, CAPACITY, M, D> {
    /// Creates an array in which every slot is empty, using the default configuration.
    ///
    /// In tracked modes, use [`builder()`][Self::builder] to customize the configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::new_inner(DropPolicy::default())
    }

    #[must_use]
    pub(crate) fn new_inner(drop_policy: DropPolicy) -> Self {
        const {
            assert!(CAPACITY > 0, "StackArray must have non-zero capacity");
        }

        Self {
            slots: [const { MaybeUninit::uninit() }; CAPACITY],
            flags: <M::Flags<CAPACITY> as LivenessFlags>::all_vacant(),
            drop_policy: <M::PolicyStorage as DropPolicyStorage>::store(drop_policy),
            _defaults: PhantomData,
        }
    }

    /// The number of slots in the array.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        CAPACITY
    }
}

impl<T, const CAPACITY: usize, M: TrackedMode, D> StackArray<T, CAPACITY, M, D> {
    /// Starts building an array with a custom configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use stack_array::{DropPolicy, SafeStackArray};
    ///
    /// let array = SafeStackArray::<u64, 32>::builder()
    ///     .drop_policy(DropPolicy::MustNotDropItems)
    ///     .build();
    ///
    /// assert_eq!(array.drop_policy(), DropPolicy::MustNotDropItems);
    /// ```
    pub fn builder() -> StackArrayBuilder<T, CAPACITY, M, D> {
        StackArrayBuilder::new()
    }

    /// The drop policy the array was created with.
    #[must_use]
    pub fn drop_policy(&self) -> DropPolicy {
        self.drop_policy.policy()
    }
}

impl<T, const CAPACITY: usize, M: ManagementMode, D> Default for StackArray<T, CAPACITY, M, D> {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: The slots are an inline array of `CAPACITY` elements that we only hand out through the
// base pointers. In tracked modes the flags are a `[bool; CAPACITY]` whose accessors panic on an
// out of bounds index; in `Unmanaged` mode they are `NoLivenessFlags`, which report every slot as
// empty and ignore writes. We never touch slot contents ourselves except through the sweep on
// drop, which goes through the element lifetime machinery.
unsafe impl<T, const CAPACITY: usize, M: ManagementMode, D> SlotStorage
    for StackArray<T, CAPACITY, M, D>
{
    type Item = T;
    type Mode = M;
    type Defaults = D;

    fn capacity(&self) -> usize {
        CAPACITY
    }

    fn slots_ptr(&self) -> *const MaybeUninit<T> {
        self.slots.as_ptr()
    }

    fn slots_mut_ptr(&mut self) -> *mut MaybeUninit<T> {
        self.slots.as_mut_ptr()
    }

    fn is_live(&self, index: usize) -> bool {
        self.flags.get(index)
    }

    unsafe fn set_live(&mut self, index: usize, live: bool) {
        self.flags.set(index, live);
    }
}

impl<T, const CAPACITY: usize, M: ManagementMode, D> Drop for StackArray<T, CAPACITY, M, D> {
    fn drop(&mut self) {
        // Unmanaged arrays do not know what is live, so this is a no-op for them.
        let destroyed = slot::destroy_live_slots(self);

        // We check the policy after cleaning up. If we are already panicking, we do not want to
        // panic again because that would obscure the original panic.
        if self.drop_policy.policy() == DropPolicy::MustNotDropItems && !thread::panicking() {
            assert!(
                destroyed == 0,
                "dropped a {} array of {} holding {destroyed} live elements under MustNotDropItems",
                M::NAME,
                type_name::<T>()
            );
        }
    }
}

impl<T: Clone, const CAPACITY: usize, M: TrackedMode, D> Clone for StackArray<T, CAPACITY, M, D> {
    fn clone(&self) -> Self {
        let mut copy = Self::new_inner(self.drop_policy.policy());

        for index in 0..CAPACITY {
            if let Ok(value) = self.try_get(index) {
                copy.move_to(index, value.clone());
            }
        }

        copy
    }
}

impl<T, const CAPACITY: usize, M: ManagementMode, D> fmt::Debug for StackArray<T, CAPACITY, M, D> {
    #[cfg_attr(test, mutants::skip)] // Diagnostic output only, no behavior to verify.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("StackArray");

        debug
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("capacity", &CAPACITY)
            .field("mode", &format_args!("{}", M::NAME));

        if M::TRACKS_LIVENESS {
            debug
                .field("drop_policy", &self.drop_policy.policy())
                .field("live_count", &slot::count_live(self));
        }

        debug.finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;
    use crate::{Probe, RawElementLifetime, SharedCounter};

    assert_impl_all!(ManagedStackArray<String, 4>: Send, Sync, Default, Clone);
    assert_impl_all!(SafeStackArray<String, 4>: Send, Sync, Clone);
    assert_impl_all!(UnmanagedStackArray<String, 4>: Send, Sync, Default);
    assert_not_impl_any!(UnmanagedStackArray<String, 4>: Clone);
    assert_not_impl_any!(ManagedStackArray<Rc<u8>, 4>: Send, Sync);
    assert_not_impl_any!(ManagedStackArray<Cell<u8>, 4>: Sync);

    #[test]
    fn new_array_is_empty() {
        let array = ManagedStackArray::<String, 4>::new();

        assert_eq!(array.capacity(), 4);
        assert_eq!(array.live_count(), 0);

        for index in 0..4 {
            assert!(!array.is_live(index));
        }
    }

    #[test]
    fn unmanaged_array_is_as_large_as_its_slots() {
        assert_eq!(size_of::<UnmanagedStackArray<u64, 4>>(), size_of::<[u64; 4]>());
        assert_eq!(size_of::<UnmanagedStackArray<u8, 16>>(), size_of::<[u8; 16]>());
        assert_eq!(
            size_of::<UnmanagedStackArray<String, 3>>(),
            size_of::<[String; 3]>()
        );
    }

    #[test]
    fn managed_array_stores_flags_and_policy() {
        assert_eq!(
            size_of::<ManagedStackArray<u8, 16>>(),
            size_of::<[u8; 16]>() + size_of::<[bool; 16]>() + size_of::<DropPolicy>()
        );
    }

    #[test]
    fn default_equals_new() {
        let array = SafeStackArray::<u32, 2>::default();

        assert_eq!(array.live_count(), 0);
        assert_eq!(array.drop_policy(), DropPolicy::MayDropItems);
    }

    #[test]
    fn drop_destroys_live_elements_once() {
        let counter = SharedCounter::new();

        {
            let mut array = ManagedStackArray::<Probe<u32, SharedCounter>, 4>::new();
            array.move_to(0, Probe::new(1, counter.clone()));
            array.move_to(2, Probe::new(2, counter.clone()));
            array.move_to(2, Probe::new(3, counter.clone()));

            assert_eq!(counter.counts().dropped(), 1);
        }

        assert_eq!(counter.counts().dropped(), 3);
        assert_eq!(counter.counts().alive(), 0);
    }

    #[test]
    fn unmanaged_drop_destroys_nothing() {
        let counter = SharedCounter::new();

        {
            let mut array = UnmanagedStackArray::<Probe<u32, SharedCounter>, 4>::new();

            // SAFETY: Index 1 is in bounds.
            unsafe {
                array.move_to(1, Probe::new(1, counter.clone()));
            }
        }

        assert_eq!(counter.counts().constructed(), 1);
        assert_eq!(counter.counts().dropped(), 0);
    }

    #[test]
    fn clone_copies_live_elements_only() {
        let mut original = ManagedStackArray::<String, 4>::builder()
            .drop_policy(DropPolicy::MayDropItems)
            .build();
        original.move_to(1, "one".to_string());
        original.move_to(3, "three".to_string());

        let copy = original.clone();

        assert_eq!(copy.live_count(), 2);
        assert!(!copy.is_live(0));
        assert_eq!(copy.try_get(1).map(String::as_str), Ok("one"));
        assert!(!copy.is_live(2));
        assert_eq!(copy.try_get(3).map(String::as_str), Ok("three"));
        assert_eq!(copy.drop_policy(), original.drop_policy());

        // The copy is independent of the original.
        original.destroy_all_elements();
        assert_eq!(copy.live_count(), 2);
    }

    #[test]
    fn clone_of_empty_array_is_empty() {
        let original = SafeStackArray::<String, 4>::new();

        let copy = original.clone();

        assert_eq!(copy.live_count(), 0);
    }

    #[test]
    fn moving_array_keeps_elements() {
        let mut array = ManagedStackArray::<String, 2>::new();
        array.move_to(1, "moved".to_string());

        let boxed = Box::new(array);

        assert_eq!(boxed.try_get(1).map(String::as_str), Ok("moved"));
        assert!(!boxed.is_live(0));
    }

    #[test]
    fn must_not_drop_policy_allows_empty_drop() {
        let mut array = ManagedStackArray::<String, 2>::builder()
            .drop_policy(DropPolicy::MustNotDropItems)
            .build();

        array.move_to(0, "temporary".to_string());
        array.destroy_at(0);

        drop(array);
    }

    #[test]
    #[should_panic]
    fn must_not_drop_policy_panics_with_live_elements() {
        let mut array = ManagedStackArray::<String, 2>::builder()
            .drop_policy(DropPolicy::MustNotDropItems)
            .build();

        array.move_to(0, "leftover".to_string());

        drop(array);
    }

    #[test]
    fn must_not_drop_policy_still_destroys_elements() {
        let counter = SharedCounter::new();

        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut array = ManagedStackArray::<Probe<u8, SharedCounter>, 2>::builder()
                .drop_policy(DropPolicy::MustNotDropItems)
                .build();

            array.move_to(0, Probe::new(7, counter.clone()));
        }));

        assert!(result.is_err());
        assert_eq!(counter.counts().dropped(), 1);
    }

    #[test]
    fn must_not_drop_policy_is_satisfied_by_forgetting() {
        let mut array = ManagedStackArray::<u32, 2>::builder()
            .drop_policy(DropPolicy::MustNotDropItems)
            .build();

        array.move_to(0, 5);
        array.forget_all_elements();

        drop(array);
    }

    #[test]
    fn unmanaged_debug_output_omits_drop_policy() {
        let array = UnmanagedStackArray::<u32, 2>::new();

        let output = format!("{array:?}");

        assert!(output.contains("Unmanaged"));
        assert!(!output.contains("drop_policy"));
        assert!(!output.contains("live_count"));
    }

    #[test]
    fn debug_output_describes_array() {
        let mut array = ManagedStackArray::<u16, 3>::new();
        array.move_to(1, 9);

        let output = format!("{array:?}");

        assert!(output.contains("StackArray"));
        assert!(output.contains("u16"));
        assert!(output.contains("Managed"));
        assert!(output.contains("live_count: 1"));
    }

    #[test]
    fn zero_sized_elements_are_tracked() {
        let mut array = ManagedStackArray::<(), 3>::new();

        array.move_to(2, ());

        assert_eq!(array.live_count(), 1);
        assert_eq!(array.try_get(2), Ok(&()));
    }
}
