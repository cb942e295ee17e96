use std::mem::MaybeUninit;

use crate::{DefaultFactory, SlotError, SlotStorage, TrackedMode, Unmanaged, slot};

/// Element operations for storages whose [mode][crate::ManagementMode] tracks liveness:
/// [`Managed`][crate::Managed] and [`ManagedWithBoundsChecks`][crate::ManagedWithBoundsChecks].
///
/// Implemented for every [`SlotStorage`] in a tracked mode. All operations are built on the
/// storage primitives alone, so every storage gets identical behavior.
///
/// # Guarantees
///
/// * Every write destroys the previous value of the slot (if any) before the new value is
///   constructed, then marks the slot live.
/// * Every read of an empty slot first materializes a default value using the
///   [default-construction policy][DefaultFactory] of the storage, so uninitialized memory is
///   never observed.
/// * In [`ManagedWithBoundsChecks`][crate::ManagedWithBoundsChecks] mode, the index is checked
///   before any other work is done. In [`Managed`][crate::Managed] mode, the liveness lookup
///   that every operation starts with rejects out of bounds indexes instead.
/// * The fallible accessors [`try_get()`][Self::try_get], [`try_get_mut()`][Self::try_get_mut]
///   and [`try_take()`][Self::try_take] never panic, in either mode. An out of bounds index is
///   reported as [`SlotError::OutOfBounds`], even in
///   [`ManagedWithBoundsChecks`][crate::ManagedWithBoundsChecks] mode, where every other indexed
///   operation panics.
///
/// # Examples
///
/// ```
/// use stack_array::{ElementLifetime, ManagedStackArray};
///
/// let mut names = ManagedStackArray::<String, 4>::new();
///
/// names.move_to(0, "Alice".to_string());
/// names.create_at(1, || "Bob".to_string());
///
/// // Overwriting drops the previous value first.
/// names.copy_to(0, &"Carol".to_string());
///
/// assert_eq!(names.const_ref_from(0), "Carol");
/// assert_eq!(names.move_from(1), "Bob");
///
/// // Slot 2 was never written, so reading it materializes a default value.
/// assert_eq!(names.const_ref_from(2), "");
///
/// assert_eq!(names.live_count(), 2);
/// ```
pub trait ElementLifetime: SlotStorage<Mode: TrackedMode> {
    /// Clones `value` into slot `index`, destroying any value the slot previously held.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    fn copy_to(&mut self, index: usize, value: &Self::Item)
    where
        Self::Item: Clone,
    {
        // SAFETY: Tracked mode, so the index is validated before the slot is touched.
        unsafe {
            slot::emplace(self, index, || value.clone());
        }
    }

    /// Moves `value` into slot `index`, destroying any value the slot previously held.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    fn move_to(&mut self, index: usize, value: Self::Item) {
        // SAFETY: Tracked mode, so the index is validated before the slot is touched.
        unsafe {
            slot::emplace(self, index, || value);
        }
    }

    /// Constructs a value in slot `index` from the value returned by `make`, destroying any value
    /// the slot previously held.
    ///
    /// The previous value is destroyed before `make` is called.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds. If `make` panics, the slot is left empty.
    fn create_at(&mut self, index: usize, make: impl FnOnce() -> Self::Item) {
        // SAFETY: Tracked mode, so the index is validated before the slot is touched.
        unsafe {
            slot::emplace(self, index, make);
        }
    }

    /// Constructs a default value in slot `index` using the default-construction policy of the
    /// storage, destroying any value the slot previously held.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    fn create_default_at(&mut self, index: usize)
    where
        Self::Defaults: DefaultFactory<Self::Item>,
    {
        <Self as ElementLifetime>::create_at(
            self,
            index,
            <Self::Defaults as DefaultFactory<Self::Item>>::make_default,
        );
    }

    /// Lets `init` construct a value directly in the memory of slot `index`, destroying any value
    /// the slot previously held.
    ///
    /// This avoids moving the value into place, which may matter for large types.
    ///
    /// # Safety
    ///
    /// `init` must fully initialize the `MaybeUninit<T>` it is given before returning.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds. If `init` panics, the slot is left empty.
    unsafe fn create_with(
        &mut self,
        index: usize,
        init: impl FnOnce(&mut MaybeUninit<Self::Item>),
    ) {
        // SAFETY: Tracked mode, so the index is validated before the slot is touched. The caller
        // guarantees that `init` initializes the slot.
        unsafe {
            slot::emplace_with(self, index, init);
        }
    }

    /// Destroys the value in slot `index`, if there is one. The slot is empty afterwards.
    ///
    /// Calling this on an empty slot does nothing.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    fn destroy_at(&mut self, index: usize) {
        // SAFETY: Tracked mode, so the index is validated and liveness checked before the slot
        // is touched.
        unsafe {
            slot::destroy(self, index);
        }
    }

    /// Returns a clone of the value in slot `index`.
    ///
    /// If the slot is empty, a default value is materialized in it first.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    fn copy_from(&mut self, index: usize) -> Self::Item
    where
        Self::Item: Clone,
        Self::Defaults: DefaultFactory<Self::Item>,
    {
        <Self as ElementLifetime>::const_ref_from(self, index).clone()
    }

    /// Moves the value out of slot `index`, leaving the slot empty.
    ///
    /// If the slot is empty, a default value is materialized and returned.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    fn move_from(&mut self, index: usize) -> Self::Item
    where
        Self::Defaults: DefaultFactory<Self::Item>,
    {
        materialize(self, index);

        // SAFETY: The slot is about to be moved out of, after which the flag must be clear.
        unsafe {
            self.set_live(index, false);
        }

        // SAFETY: `materialize()` validated the index and made the slot live.
        let slot = unsafe { slot::slot(self, index) };

        // SAFETY: The slot holds a live value and its flag is cleared, so nobody else will read
        // or drop this copy of the value.
        unsafe { slot.assume_init_read() }
    }

    /// Returns an exclusive reference to the value in slot `index`.
    ///
    /// If the slot is empty, a default value is materialized in it first.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    fn ref_from(&mut self, index: usize) -> &mut Self::Item
    where
        Self::Defaults: DefaultFactory<Self::Item>,
    {
        materialize(self, index);

        // SAFETY: `materialize()` validated the index.
        let slot = unsafe { slot::slot_mut(self, index) };

        // SAFETY: `materialize()` made the slot live.
        unsafe { slot.assume_init_mut() }
    }

    /// Returns a shared reference to the value in slot `index`.
    ///
    /// If the slot is empty, a default value is materialized in it first, which is why this
    /// takes `&mut self`. Use [`try_get()`][Self::try_get] to read through a shared reference.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    fn const_ref_from(&mut self, index: usize) -> &Self::Item
    where
        Self::Defaults: DefaultFactory<Self::Item>,
    {
        materialize(self, index);

        // SAFETY: `materialize()` validated the index.
        let slot = unsafe { slot::slot(self, index) };

        // SAFETY: `materialize()` made the slot live.
        unsafe { slot.assume_init_ref() }
    }

    /// Returns a shared reference to the value in slot `index`, without materializing anything.
    ///
    /// Never panics, not even in
    /// [`ManagedWithBoundsChecks`][crate::ManagedWithBoundsChecks] mode.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::OutOfBounds`] if `index` is out of bounds and [`SlotError::Vacant`]
    /// if the slot is empty.
    fn try_get(&self, index: usize) -> Result<&Self::Item, SlotError> {
        ensure_live(self, index)?;

        // SAFETY: `ensure_live()` validated the index.
        let slot = unsafe { slot::slot(self, index) };

        // SAFETY: `ensure_live()` confirmed the slot is live.
        Ok(unsafe { slot.assume_init_ref() })
    }

    /// Returns an exclusive reference to the value in slot `index`, without materializing
    /// anything.
    ///
    /// Never panics, not even in
    /// [`ManagedWithBoundsChecks`][crate::ManagedWithBoundsChecks] mode.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::OutOfBounds`] if `index` is out of bounds and [`SlotError::Vacant`]
    /// if the slot is empty.
    fn try_get_mut(&mut self, index: usize) -> Result<&mut Self::Item, SlotError> {
        ensure_live(self, index)?;

        // SAFETY: `ensure_live()` validated the index.
        let slot = unsafe { slot::slot_mut(self, index) };

        // SAFETY: `ensure_live()` confirmed the slot is live.
        Ok(unsafe { slot.assume_init_mut() })
    }

    /// Moves the value out of slot `index`, leaving the slot empty, without materializing
    /// anything.
    ///
    /// Never panics, not even in
    /// [`ManagedWithBoundsChecks`][crate::ManagedWithBoundsChecks] mode.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::OutOfBounds`] if `index` is out of bounds and [`SlotError::Vacant`]
    /// if the slot is empty.
    fn try_take(&mut self, index: usize) -> Result<Self::Item, SlotError> {
        ensure_live(self, index)?;

        // SAFETY: The slot is about to be moved out of, after which the flag must be clear.
        unsafe {
            self.set_live(index, false);
        }

        // SAFETY: `ensure_live()` validated the index.
        let slot = unsafe { slot::slot(self, index) };

        // SAFETY: The slot was live and its flag is cleared, so nobody else will read or drop
        // this copy of the value.
        Ok(unsafe { slot.assume_init_read() })
    }

    /// Returns the number of slots that currently hold a live value.
    #[must_use]
    fn live_count(&self) -> usize {
        slot::count_live(self)
    }

    /// Marks every slot as empty without running any destructor.
    ///
    /// The container relinquishes ownership of its live values: they will never be dropped by the
    /// container. Use this when the values have been taken over by other means (e.g. copied out
    /// bitwise by unsafe code). If nothing took them over, they are leaked.
    fn forget_all_elements(&mut self) {
        slot::forget_live_slots(self);
    }

    /// Destroys every live value. All slots are empty afterwards.
    fn destroy_all_elements(&mut self) {
        slot::destroy_live_slots(self);
    }
}

impl<S> ElementLifetime for S where S: SlotStorage<Mode: TrackedMode> + ?Sized {}

/// Element operations for storages in [`Unmanaged`] mode.
///
/// Implemented for every [`SlotStorage`] in [`Unmanaged`] mode. The container keeps no record of
/// which slots hold live values, so it cannot protect the caller from misuse: every operation
/// that takes an index is `unsafe` and the caller is responsible for pairing each construction
/// with exactly one destruction (or deliberately leaking the value).
///
/// Writes never destroy the previous value of a slot. Overwriting a live slot leaks its value,
/// which is sound but skips its destructor.
///
/// # Examples
///
/// ```
/// use stack_array::{RawElementLifetime, UnmanagedStackArray};
///
/// let mut array = UnmanagedStackArray::<String, 4>::new();
///
/// // SAFETY: Index 0 is in bounds.
/// unsafe {
///     array.move_to(0, "hello".to_string());
/// }
///
/// // SAFETY: Index 0 is in bounds and holds a live value.
/// assert_eq!(unsafe { array.const_ref_from(0) }, "hello");
///
/// // The container will not drop the value for us, so we must do it ourselves.
/// // SAFETY: Index 0 is in bounds and holds a live value that nothing else will drop.
/// unsafe {
///     array.destroy_at(0);
/// }
/// ```
pub trait RawElementLifetime: SlotStorage<Mode = Unmanaged> {
    /// Clones `value` into slot `index`.
    ///
    /// # Safety
    ///
    /// `index` must be less than the capacity of the storage.
    unsafe fn copy_to(&mut self, index: usize, value: &Self::Item)
    where
        Self::Item: Clone,
    {
        // SAFETY: Forwarding safety requirements to the caller.
        unsafe {
            slot::emplace(self, index, || value.clone());
        }
    }

    /// Moves `value` into slot `index`.
    ///
    /// # Safety
    ///
    /// `index` must be less than the capacity of the storage.
    unsafe fn move_to(&mut self, index: usize, value: Self::Item) {
        // SAFETY: Forwarding safety requirements to the caller.
        unsafe {
            slot::emplace(self, index, || value);
        }
    }

    /// Constructs a value in slot `index` from the value returned by `make`.
    ///
    /// # Safety
    ///
    /// `index` must be less than the capacity of the storage.
    unsafe fn create_at(&mut self, index: usize, make: impl FnOnce() -> Self::Item) {
        // SAFETY: Forwarding safety requirements to the caller.
        unsafe {
            slot::emplace(self, index, make);
        }
    }

    /// Constructs a default value in slot `index` using the default-construction policy of the
    /// storage.
    ///
    /// # Safety
    ///
    /// `index` must be less than the capacity of the storage.
    unsafe fn create_default_at(&mut self, index: usize)
    where
        Self::Defaults: DefaultFactory<Self::Item>,
    {
        // SAFETY: Forwarding safety requirements to the caller.
        unsafe {
            <Self as RawElementLifetime>::create_at(
                self,
                index,
                <Self::Defaults as DefaultFactory<Self::Item>>::make_default,
            );
        }
    }

    /// Lets `init` construct a value directly in the memory of slot `index`.
    ///
    /// # Safety
    ///
    /// `index` must be less than the capacity of the storage and `init` must fully initialize the
    /// `MaybeUninit<T>` it is given before returning.
    unsafe fn create_with(
        &mut self,
        index: usize,
        init: impl FnOnce(&mut MaybeUninit<Self::Item>),
    ) {
        // SAFETY: Forwarding safety requirements to the caller.
        unsafe {
            slot::emplace_with(self, index, init);
        }
    }

    /// Runs the destructor of the value in slot `index`. The slot is empty afterwards.
    ///
    /// # Safety
    ///
    /// `index` must be less than the capacity of the storage and the slot must hold a live value
    /// that nothing else is going to drop.
    unsafe fn destroy_at(&mut self, index: usize) {
        // SAFETY: Forwarding safety requirements to the caller.
        unsafe {
            slot::destroy(self, index);
        }
    }

    /// Returns a clone of the value in slot `index`.
    ///
    /// # Safety
    ///
    /// `index` must be less than the capacity of the storage and the slot must hold a live value.
    #[must_use]
    unsafe fn copy_from(&self, index: usize) -> Self::Item
    where
        Self::Item: Clone,
    {
        // SAFETY: Forwarding safety requirements to the caller.
        unsafe { <Self as RawElementLifetime>::const_ref_from(self, index) }.clone()
    }

    /// Moves the value out of slot `index`. The slot is empty afterwards.
    ///
    /// # Safety
    ///
    /// `index` must be less than the capacity of the storage and the slot must hold a live value.
    /// The slot must not be read or destroyed again until a new value has been written to it.
    #[must_use]
    unsafe fn move_from(&mut self, index: usize) -> Self::Item {
        // SAFETY: Forwarding bounds requirement to the caller.
        let slot = unsafe { slot::slot(self, index) };

        // SAFETY: The caller guarantees the slot is live and will be treated as empty from now on.
        unsafe { slot.assume_init_read() }
    }

    /// Returns an exclusive reference to the value in slot `index`.
    ///
    /// # Safety
    ///
    /// `index` must be less than the capacity of the storage and the slot must hold a live value.
    #[must_use]
    unsafe fn ref_from(&mut self, index: usize) -> &mut Self::Item {
        // SAFETY: Forwarding bounds requirement to the caller.
        let slot = unsafe { slot::slot_mut(self, index) };

        // SAFETY: Forwarding liveness requirement to the caller.
        unsafe { slot.assume_init_mut() }
    }

    /// Returns a shared reference to the value in slot `index`.
    ///
    /// # Safety
    ///
    /// `index` must be less than the capacity of the storage and the slot must hold a live value.
    #[must_use]
    unsafe fn const_ref_from(&self, index: usize) -> &Self::Item {
        // SAFETY: Forwarding bounds requirement to the caller.
        let slot = unsafe { slot::slot(self, index) };

        // SAFETY: Forwarding liveness requirement to the caller.
        unsafe { slot.assume_init_ref() }
    }

    /// Does nothing: an unmanaged container has no ownership records to discard.
    ///
    /// Exists so that code written against both interfaces reads the same.
    fn forget_all_elements(&mut self) {
        slot::forget_live_slots(self);
    }

    /// Runs the destructor of every slot, live or not.
    ///
    /// # Safety
    ///
    /// Every slot of the storage must hold a live value that nothing else is going to drop.
    unsafe fn destroy_all_elements(&mut self) {
        for index in 0..self.capacity() {
            // SAFETY: The index is in bounds and the caller guarantees every slot is live.
            unsafe {
                slot::destroy(self, index);
            }
        }
    }
}

impl<S> RawElementLifetime for S where S: SlotStorage<Mode = Unmanaged> + ?Sized {}

/// Makes sure slot `index` holds a live value, materializing a default one if it is empty.
///
/// # Panics
///
/// Panics if `index` is out of bounds.
fn materialize<S>(storage: &mut S, index: usize)
where
    S: ElementLifetime + ?Sized,
    S::Defaults: DefaultFactory<S::Item>,
{
    slot::check_bounds(storage, index);

    if !storage.is_live(index) {
        <S as ElementLifetime>::create_default_at(storage, index);
    }
}

/// Checks that `index` is in bounds and refers to a live slot, without panicking.
fn ensure_live<S>(storage: &S, index: usize) -> Result<(), SlotError>
where
    S: ElementLifetime + ?Sized,
{
    let capacity = storage.capacity();

    if index >= capacity {
        return Err(SlotError::OutOfBounds { index, capacity });
    }

    if !storage.is_live(index) {
        return Err(SlotError::Vacant { index });
    }

    Ok(())
}
