//! A user-defined, heap-backed storage gets the same element lifetime behavior as the inline
//! `StackArray`, just by implementing `SlotStorage`.

use std::marker::PhantomData;
use std::mem::MaybeUninit;

use stack_array::{
    ElementLifetime, Managed, ManagedWithBoundsChecks, Probe, SharedCounter, SlotError,
    SlotStorage, TrackedMode, UseDefault,
};

/// Slots allocated on the heap, with the capacity chosen at runtime.
struct HeapSlots<T, M: TrackedMode> {
    slots: Box<[MaybeUninit<T>]>,
    flags: Box<[bool]>,

    _mode: PhantomData<M>,
}

impl<T, M: TrackedMode> HeapSlots<T, M> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| MaybeUninit::uninit()).collect(),
            flags: vec![false; capacity].into_boxed_slice(),
            _mode: PhantomData,
        }
    }
}

// SAFETY: The slot buffer never changes size, every flag starts cleared and indexing the flag
// slice panics for an out of bounds index.
unsafe impl<T, M: TrackedMode> SlotStorage for HeapSlots<T, M> {
    type Item = T;
    type Mode = M;
    type Defaults = UseDefault;

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn slots_ptr(&self) -> *const MaybeUninit<T> {
        self.slots.as_ptr()
    }

    fn slots_mut_ptr(&mut self) -> *mut MaybeUninit<T> {
        self.slots.as_mut_ptr()
    }

    fn is_live(&self, index: usize) -> bool {
        self.flags[index]
    }

    unsafe fn set_live(&mut self, index: usize, live: bool) {
        self.flags[index] = live;
    }
}

impl<T, M: TrackedMode> Drop for HeapSlots<T, M> {
    fn drop(&mut self) {
        self.destroy_all_elements();
    }
}

type Counted = Probe<u32, SharedCounter>;

#[test]
fn overwrite_and_drop_behave_like_inline_storage() {
    let counter = SharedCounter::new();

    {
        let mut slots = HeapSlots::<Counted, Managed>::with_capacity(4);

        slots.create_at(0, || Probe::new(1, counter.clone()));
        slots.create_at(1, || Probe::new(2, counter.clone()));
        slots.move_to(0, Probe::new(3, counter.clone()));

        assert_eq!(counter.counts().dropped(), 1);
        assert_eq!(slots.try_get(0).map(|p| **p), Ok(3));
        assert_eq!(slots.live_count(), 2);
    }

    assert_eq!(counter.counts().dropped(), 3);
}

#[test]
fn reads_materialize_defaults() {
    let mut slots = HeapSlots::<String, Managed>::with_capacity(3);

    slots.ref_from(2).push_str("filled");

    assert_eq!(slots.const_ref_from(1), "");
    assert_eq!(slots.move_from(2), "filled");
    assert_eq!(slots.live_count(), 1);
}

#[test]
fn fallible_accessors_use_runtime_capacity() {
    let mut slots = HeapSlots::<u64, ManagedWithBoundsChecks>::with_capacity(5);

    slots.move_to(4, 44);

    assert_eq!(slots.try_get(4), Ok(&44));
    assert_eq!(
        slots.try_get(5).err(),
        Some(SlotError::OutOfBounds {
            index: 5,
            capacity: 5,
        })
    );
    assert_eq!(slots.try_take(3).err(), Some(SlotError::Vacant { index: 3 }));
}

#[test]
fn forget_and_destroy_all() {
    let counter = SharedCounter::new();
    let mut slots = HeapSlots::<Counted, Managed>::with_capacity(6);

    for index in 0..6 {
        slots.move_to(index, Probe::new(0, counter.clone()));
    }

    slots.destroy_all_elements();
    assert_eq!(counter.counts().dropped(), 6);

    slots.move_to(2, Probe::new(0, counter.clone()));
    slots.forget_all_elements();
    drop(slots);

    assert_eq!(counter.counts().dropped(), 6);
    assert_eq!(counter.counts().alive(), 1);
}

#[test]
#[should_panic]
fn bounds_checked_mode_rejects_index_past_end() {
    let mut slots = HeapSlots::<u8, ManagedWithBoundsChecks>::with_capacity(2);
    slots.move_to(2, 1);
}

#[test]
#[should_panic]
fn managed_mode_rejects_index_past_end_through_flags() {
    let mut slots = HeapSlots::<u8, Managed>::with_capacity(2);
    _ = slots.const_ref_from(2);
}
