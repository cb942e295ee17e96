//! A fixed-capacity array stored inline, in which elements are constructed and destroyed only
//! when the caller explicitly asks for it.
//!
//! This crate provides [`StackArray`], a container of `CAPACITY` slots that each either hold a
//! value or are empty. Creating the array constructs nothing. Elements come into existence
//! through explicit operations (copy in, move in, construct from a closure, construct a default)
//! and leave it through explicit operations (destroy, move out) or when the array is dropped.
//!
//! How much of the element bookkeeping the array does by itself is selected at compile time with
//! a [management mode][ManagementMode]:
//!
//! | Mode                        | Liveness flags | Destroys elements | Bounds checks | API    |
//! |-----------------------------|----------------|-------------------|---------------|--------|
//! | [`Unmanaged`]               | no             | no                | no            | unsafe |
//! | [`Managed`]                 | yes            | yes               | via flags     | safe   |
//! | [`ManagedWithBoundsChecks`] | yes            | yes               | explicit      | safe   |
//!
//! # Key Features
//!
//! - **Deferred construction**: slots start empty, so element types do not need a default value
//!   unless you read a slot that was never written
//! - **Zero overhead when unmanaged**: an [`Unmanaged`] array carries no liveness flags and no
//!   drop policy, so it is exactly as large as its slots
//! - **Pluggable storage**: the element operations are written once against the [`SlotStorage`]
//!   contract and work the same for any storage that implements it
//! - **Default-construction policies**: choose how missing elements are materialized with
//!   [`DefaultFactory`] and the [`default_policy!`] macro
//! - **Flexible drop policies**: configure what happens to live elements when the array is dropped
//! - **Lifetime probes**: [`Probe`] reports construction, cloning and destruction of elements to an
//!   observer of your choice
//!
//! # Examples
//!
//! ## Managed array
//!
//! ```rust
//! use stack_array::{ElementLifetime, ManagedStackArray};
//!
//! let mut array = ManagedStackArray::<String, 4>::new();
//!
//! array.move_to(0, "first".to_string());
//!
//! // Writing to a live slot destroys the previous value first.
//! array.move_to(0, "second".to_string());
//!
//! // Non-materializing reads report empty slots instead of creating a value.
//! assert!(array.try_get(1).is_err());
//!
//! // Materializing reads fill empty slots with a default value.
//! assert_eq!(array.const_ref_from(1), "");
//!
//! assert_eq!(array.move_from(0), "second");
//! assert_eq!(array.live_count(), 1);
//! ```
//!
//! ## Unmanaged array
//!
//! ```rust
//! use stack_array::{RawElementLifetime, UnmanagedStackArray};
//!
//! let mut array = UnmanagedStackArray::<Vec<u8>, 2>::new();
//!
//! // SAFETY: Index 1 is in bounds.
//! unsafe {
//!     array.create_at(1, || vec![1, 2, 3]);
//! }
//!
//! // SAFETY: Index 1 is in bounds and holds a live value.
//! let taken = unsafe { array.move_from(1) };
//! assert_eq!(taken, [1, 2, 3]);
//!
//! // Slot 1 is now empty and the array will not touch it again.
//! ```

mod builder;
mod default_policy;
mod drop_policy;
mod error;
mod lifetime;
mod mode;
mod probe;
mod slot;
mod stack_array;
mod storage;

pub use builder::*;
pub use default_policy::*;
pub use drop_policy::*;
pub use error::*;
pub use lifetime::*;
pub use mode::*;
pub use probe::*;
pub use stack_array::*;
pub use storage::*;

trait Sealed {}
