//! Element operations written once over any [`SlotStorage`], shared by the safe and the raw
//! element lifetime interfaces.
//!
//! Typed access to a slot always goes through [`slot()`] or [`slot_mut()`], which derive a fresh
//! `MaybeUninit<T>` view from the storage base pointer. Views are never cached across operations,
//! so every read observes the result of the most recent write to that slot.
//!
//! Branches on the mode constants are resolved during monomorphization.

use std::any::type_name;
use std::mem::MaybeUninit;

use tracing::trace;

use crate::{ManagementMode, SlotStorage};

/// Validates `index` if the mode of the storage checks bounds; nothing otherwise.
///
/// # Panics
///
/// Panics if the mode checks bounds and `index` is out of bounds.
#[inline]
pub(crate) fn check_bounds<S>(storage: &S, index: usize)
where
    S: SlotStorage + ?Sized,
{
    if <S::Mode as ManagementMode>::CHECKS_BOUNDS {
        let capacity = storage.capacity();

        assert!(
            index < capacity,
            "index {index} out of bounds in {} container of {} with capacity {capacity}",
            <S::Mode as ManagementMode>::NAME,
            type_name::<S::Item>()
        );
    }
}

/// Returns a typed view of slot `index` for reading.
///
/// # Safety
///
/// `index` must be less than the capacity of the storage.
#[inline]
pub(crate) unsafe fn slot<S>(storage: &S, index: usize) -> &MaybeUninit<S::Item>
where
    S: SlotStorage + ?Sized,
{
    // SAFETY: The storage contract guarantees `capacity()` contiguous slots starting at the base
    // pointer and the caller guarantees that `index` is within them.
    let slot_ptr = unsafe { storage.slots_ptr().add(index) };

    // SAFETY: The storage contract guarantees the pointer is valid for reads for as long as we
    // borrow the storage, which the returned reference does.
    unsafe { &*slot_ptr }
}

/// Returns a typed view of slot `index` for reading and writing.
///
/// # Safety
///
/// `index` must be less than the capacity of the storage.
#[inline]
pub(crate) unsafe fn slot_mut<S>(storage: &mut S, index: usize) -> &mut MaybeUninit<S::Item>
where
    S: SlotStorage + ?Sized,
{
    // SAFETY: The storage contract guarantees `capacity()` contiguous slots starting at the base
    // pointer and the caller guarantees that `index` is within them.
    let slot_ptr = unsafe { storage.slots_mut_ptr().add(index) };

    // SAFETY: The storage contract guarantees the pointer is valid for reads and writes for as
    // long as we exclusively borrow the storage, which the returned reference does.
    unsafe { &mut *slot_ptr }
}

/// Destroys the value in slot `index` if the liveness flag says there is one.
///
/// Returns whether a value was destroyed. Storages that do not track liveness never report a
/// live slot, so this does nothing for them.
///
/// # Panics
///
/// Panics if the storage tracks liveness and `index` is out of bounds.
pub(crate) fn destroy_if_live<S>(storage: &mut S, index: usize) -> bool
where
    S: SlotStorage + ?Sized,
{
    // The storage contract makes this lookup panic for an out of bounds index in tracked modes,
    // before any slot memory is touched.
    if !storage.is_live(index) {
        return false;
    }

    // The flag is cleared before the value is dropped, so a panicking destructor can at worst
    // leak the value, never drop it twice.
    // SAFETY: Clearing a flag can only make the container forget a value, which is sound.
    unsafe {
        storage.set_live(index, false);
    }

    // SAFETY: The flag was set, so the index is in bounds and the slot holds a live value that
    // nothing else is going to drop.
    let slot = unsafe { slot_mut(storage, index) };

    // SAFETY: See above - the slot holds a live value.
    unsafe {
        slot.assume_init_drop();
    }

    true
}

/// Writes the value returned by `make` into slot `index`.
///
/// In tracked modes, a previous value is destroyed before `make` is called and the slot is
/// marked live once the new value is in place. In `Unmanaged` mode a previous value is
/// overwritten without being dropped.
///
/// # Safety
///
/// If the mode does not track liveness, `index` must be less than the capacity of the storage.
///
/// # Panics
///
/// Panics if the mode checks bounds or tracks liveness and `index` is out of bounds.
/// Propagates panics from `make`, in which case the slot is left empty.
pub(crate) unsafe fn emplace<S>(storage: &mut S, index: usize, make: impl FnOnce() -> S::Item)
where
    S: SlotStorage + ?Sized,
{
    check_bounds(storage, index);

    if <S::Mode as ManagementMode>::TRACKS_LIVENESS {
        destroy_if_live(storage, index);
    }

    let value = make();

    // SAFETY: In tracked modes the liveness lookup above has validated the index, otherwise the
    // caller guarantees it.
    let slot = unsafe { slot_mut(storage, index) };
    slot.write(value);

    if <S::Mode as ManagementMode>::TRACKS_LIVENESS {
        // SAFETY: We just wrote a fully initialized value into the slot.
        unsafe {
            storage.set_live(index, true);
        }
    }
}

/// Lets `init` initialize slot `index` in place.
///
/// Lifetime handling is the same as in [`emplace()`].
///
/// # Safety
///
/// `init` must fully initialize the slot before it returns.
///
/// If the mode does not track liveness, `index` must be less than the capacity of the storage.
///
/// # Panics
///
/// Panics if the mode checks bounds or tracks liveness and `index` is out of bounds.
/// Propagates panics from `init`, in which case the slot is treated as empty.
pub(crate) unsafe fn emplace_with<S>(
    storage: &mut S,
    index: usize,
    init: impl FnOnce(&mut MaybeUninit<S::Item>),
) where
    S: SlotStorage + ?Sized,
{
    check_bounds(storage, index);

    if <S::Mode as ManagementMode>::TRACKS_LIVENESS {
        destroy_if_live(storage, index);
    }

    // SAFETY: In tracked modes the liveness lookup above has validated the index, otherwise the
    // caller guarantees it.
    let slot = unsafe { slot_mut(storage, index) };
    init(slot);

    if <S::Mode as ManagementMode>::TRACKS_LIVENESS {
        // SAFETY: The caller guarantees that `init` has fully initialized the slot.
        unsafe {
            storage.set_live(index, true);
        }
    }
}

/// Destroys the value in slot `index`.
///
/// In tracked modes this only destroys a live value and always leaves the slot empty. In
/// `Unmanaged` mode it unconditionally runs the destructor.
///
/// # Safety
///
/// If the mode does not track liveness, `index` must be less than the capacity of the storage
/// and the slot must hold a live value that nothing else is going to drop.
///
/// # Panics
///
/// Panics if the mode checks bounds or tracks liveness and `index` is out of bounds.
pub(crate) unsafe fn destroy<S>(storage: &mut S, index: usize)
where
    S: SlotStorage + ?Sized,
{
    check_bounds(storage, index);

    if <S::Mode as ManagementMode>::TRACKS_LIVENESS {
        destroy_if_live(storage, index);
    } else {
        // SAFETY: The caller guarantees the index is in bounds.
        let slot = unsafe { slot_mut(storage, index) };

        // SAFETY: The caller guarantees the slot holds a live value.
        unsafe {
            slot.assume_init_drop();
        }
    }
}

/// Destroys every live slot and clears its flag. Returns the number of values destroyed.
///
/// Does nothing for storages that do not track liveness.
pub(crate) fn destroy_live_slots<S>(storage: &mut S) -> usize
where
    S: SlotStorage + ?Sized,
{
    if !<S::Mode as ManagementMode>::TRACKS_LIVENESS {
        return 0;
    }

    let mut destroyed: usize = 0;

    for index in 0..storage.capacity() {
        if destroy_if_live(storage, index) {
            // Cannot overflow, bounded by capacity.
            destroyed = destroyed.wrapping_add(1);
        }
    }

    if destroyed > 0 {
        trace!(
            item = type_name::<S::Item>(),
            capacity = storage.capacity(),
            destroyed,
            "destroyed live elements"
        );
    }

    destroyed
}

/// Clears every liveness flag without running any destructor. Returns the number of values
/// that were live.
///
/// Does nothing for storages that do not track liveness.
pub(crate) fn forget_live_slots<S>(storage: &mut S) -> usize
where
    S: SlotStorage + ?Sized,
{
    if !<S::Mode as ManagementMode>::TRACKS_LIVENESS {
        return 0;
    }

    let mut forgotten: usize = 0;

    for index in 0..storage.capacity() {
        if storage.is_live(index) {
            // SAFETY: Clearing a flag can only make the container forget a value, which is sound.
            unsafe {
                storage.set_live(index, false);
            }

            // Cannot overflow, bounded by capacity.
            forgotten = forgotten.wrapping_add(1);
        }
    }

    if forgotten > 0 {
        trace!(
            item = type_name::<S::Item>(),
            capacity = storage.capacity(),
            forgotten,
            "forgot live elements without destroying them"
        );
    }

    forgotten
}

/// Returns the number of slots whose liveness flag is set.
pub(crate) fn count_live<S>(storage: &S) -> usize
where
    S: SlotStorage + ?Sized,
{
    (0..storage.capacity())
        .filter(|&index| storage.is_live(index))
        .count()
}
