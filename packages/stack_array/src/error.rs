use thiserror::Error;

/// Errors returned by the non-materializing accessors of tracked containers, such as
/// [`try_get()`][crate::ElementLifetime::try_get].
///
/// The regular element operations never return errors: contract violations there are either
/// compile-time errors or panics.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum SlotError {
    /// The index does not identify a slot of the container.
    #[error("index {index} is out of bounds for a container with capacity {capacity}")]
    OutOfBounds {
        /// The index the caller provided.
        index: usize,

        /// The capacity of the container.
        capacity: usize,
    },

    /// The slot exists but does not currently hold a live value.
    #[error("slot {index} does not hold a live value")]
    Vacant {
        /// The index of the empty slot.
        index: usize,
    },
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(SlotError: Send, Sync, Debug, std::error::Error);

    #[test]
    fn out_of_bounds_message_names_index_and_capacity() {
        let error = SlotError::OutOfBounds {
            index: 7,
            capacity: 4,
        };

        assert_eq!(
            error.to_string(),
            "index 7 is out of bounds for a container with capacity 4"
        );
    }

    #[test]
    fn vacant_message_names_index() {
        let error = SlotError::Vacant { index: 2 };

        assert_eq!(error.to_string(), "slot 2 does not hold a live value");
    }
}
