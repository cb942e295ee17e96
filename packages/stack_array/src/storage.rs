use std::mem::MaybeUninit;

use crate::ManagementMode;

/// The contract between a backing store and the element lifetime interface.
///
/// A backing store owns the physical memory of a fixed number of slots, plus (in tracked modes)
/// one liveness flag per slot. It answers a handful of primitive queries and contains no element
/// lifetime logic of its own. Every storage that implements this trait automatically gets the
/// complete element operation set: [`ElementLifetime`][crate::ElementLifetime] when its mode
/// tracks liveness, [`RawElementLifetime`][crate::RawElementLifetime] when it is
/// [`Unmanaged`][crate::Unmanaged].
///
/// [`StackArray`][crate::StackArray] is the storage shipped with this crate. Implement the trait
/// yourself to put the same lifetime semantics on top of a different memory layout.
///
/// # Dropping
///
/// The interface cannot hook into the drop of a storage it does not own. A storage in a tracked
/// mode should call [`destroy_all_elements()`][crate::ElementLifetime::destroy_all_elements]
/// from its `Drop` implementation, otherwise live elements are leaked.
///
/// # Safety
///
/// The element lifetime interface performs raw reads, writes and drops based on the answers of
/// this trait, so implementations must guarantee all of the following:
///
/// * [`slots_ptr()`][Self::slots_ptr] and [`slots_mut_ptr()`][Self::slots_mut_ptr] return a
///   pointer to the first of [`capacity()`][Self::capacity] contiguous `MaybeUninit<Item>`
///   slots, valid for reads (and, for the mutable variant, writes) for as long as the borrow of
///   the storage used to obtain it. The two methods point to the same memory.
/// * [`capacity()`][Self::capacity] returns the same value for the entire life of the storage.
/// * The storage never reads, writes or drops slot contents by itself, except by calling into
///   the element lifetime interface.
/// * If `Mode::TRACKS_LIVENESS` is `true`:
///   * every slot starts out with its flag cleared;
///   * [`is_live()`][Self::is_live] returns the value most recently stored by
///     [`set_live()`][Self::set_live] for the same index;
///   * both methods panic if the index is not less than [`capacity()`][Self::capacity].
///     Operations in modes without an explicit bounds check rely on this to stay in bounds.
/// * If `Mode::TRACKS_LIVENESS` is `false`, [`is_live()`][Self::is_live] returns `false` and
///   [`set_live()`][Self::set_live] does nothing.
pub unsafe trait SlotStorage {
    /// The type of the elements stored in the slots.
    type Item;

    /// The management mode that the element lifetime interface applies to this storage.
    type Mode: ManagementMode;

    /// The default-construction policy used when an element must be materialized without a
    /// caller-supplied value. See [`DefaultFactory`][crate::DefaultFactory].
    type Defaults;

    /// Returns the number of slots in the storage.
    #[must_use]
    fn capacity(&self) -> usize;

    /// Returns a pointer to the first slot, for reading.
    #[must_use]
    fn slots_ptr(&self) -> *const MaybeUninit<Self::Item>;

    /// Returns a pointer to the first slot, for reading and writing.
    #[must_use]
    fn slots_mut_ptr(&mut self) -> *mut MaybeUninit<Self::Item>;

    /// Returns whether slot `index` holds a live value according to the liveness flags.
    ///
    /// # Panics
    ///
    /// In tracked modes, panics if `index` is out of bounds.
    #[must_use]
    fn is_live(&self, index: usize) -> bool;

    /// Records whether slot `index` holds a live value.
    ///
    /// This only updates the bookkeeping; it does not touch the slot itself.
    ///
    /// # Safety
    ///
    /// Safe reads in tracked modes trust the flags, so the caller must ensure that by the time
    /// control returns to safe code, the flag of slot `index` matches the actual contents of the
    /// slot: `true` only if the slot holds a fully initialized value that nothing else will drop.
    ///
    /// # Panics
    ///
    /// In tracked modes, panics if `index` is out of bounds.
    unsafe fn set_live(&mut self, index: usize, live: bool);
}
