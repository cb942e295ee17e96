use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{DropPolicy, Managed, StackArray, TrackedMode, UseDefault};

/// Builder for creating an instance of [`StackArray`] in a tracked mode.
///
/// [`Unmanaged`][crate::Unmanaged] arrays have nothing to configure and are only created through
/// [`StackArray::new()`][1].
///
/// You only need to use this builder if you want to customize the configuration of the array.
/// The default configuration used by [`StackArray::new()`][1] is sufficient for most use cases.
///
/// # Examples
///
/// ```
/// use stack_array::{DropPolicy, ManagedStackArray};
///
/// let array = ManagedStackArray::<u32, 8>::builder()
///     .drop_policy(DropPolicy::MayDropItems)
///     .build();
/// ```
///
/// [1]: StackArray::new
#[must_use]
pub struct StackArrayBuilder<T, const CAPACITY: usize, M: TrackedMode = Managed, D = UseDefault>
{
    drop_policy: DropPolicy,

    _array: PhantomData<fn() -> StackArray<T, CAPACITY, M, D>>,
}

impl<T, const CAPACITY: usize, M: TrackedMode, D> fmt::Debug
    for StackArrayBuilder<T, CAPACITY, M, D>
{
    #[cfg_attr(test, mutants::skip)] // Diagnostic output only, no behavior to verify.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackArrayBuilder")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("capacity", &CAPACITY)
            .field("mode", &format_args!("{}", M::NAME))
            .field("drop_policy", &self.drop_policy)
            .finish()
    }
}

impl<T, const CAPACITY: usize, M: TrackedMode, D> StackArrayBuilder<T, CAPACITY, M, D> {
    pub(crate) fn new() -> Self {
        Self {
            drop_policy: DropPolicy::default(),
            _array: PhantomData,
        }
    }

    /// Sets the [drop policy][DropPolicy] for the array. This governs how to treat elements
    /// that are still live when the array is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use stack_array::{DropPolicy, SafeStackArray};
    ///
    /// let array = SafeStackArray::<u32, 8>::builder()
    ///     .drop_policy(DropPolicy::MustNotDropItems)
    ///     .build();
    /// ```
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Builds the array with the specified configuration. Every slot starts out empty.
    #[must_use]
    pub fn build(self) -> StackArray<T, CAPACITY, M, D> {
        StackArray::new_inner(self.drop_policy)
    }
}
