use std::fmt::Debug;

use crate::Sealed;

/// Determines what happens to live elements when a container is dropped.
///
/// By default, the container destroys any elements that are still live when it is dropped.
///
/// Only containers in a tracked [mode][crate::ManagementMode] have a drop policy. An
/// [`Unmanaged`][crate::Unmanaged] container does not know which of its slots are live, never
/// destroys anything on drop and therefore neither stores nor accepts a policy.
///
/// # Examples
///
/// ```
/// use stack_array::{DropPolicy, ManagedStackArray};
///
/// // The drop policy is set at container creation time.
/// let array = ManagedStackArray::<String, 16>::builder()
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The container will destroy its live elements when the container is dropped.
    /// This is the default.
    #[default]
    MayDropItems,

    /// The container will panic if it still holds live elements when it is dropped.
    ///
    /// The elements are still destroyed before the panic. This may be valuable when the
    /// elements must be handed off elsewhere (e.g. moved out or explicitly forgotten) before the
    /// container goes away, and silently dropping them would hide a logic error.
    MustNotDropItems,
}

/// How a container stores its [`DropPolicy`], as selected by
/// [`ManagementMode::PolicyStorage`][crate::ManagementMode::PolicyStorage].
///
/// Tracked modes store the policy itself. [`Unmanaged`][crate::Unmanaged] containers cannot
/// enforce a policy, so they store [`NoDropPolicy`], which occupies no memory.
///
/// This trait is sealed.
#[expect(private_bounds, reason = "intentional - sealed trait")]
pub trait DropPolicyStorage: Sealed + Copy + Debug + Send + Sync + 'static {
    /// Stores `policy`.
    #[must_use]
    fn store(policy: DropPolicy) -> Self;

    /// Returns the stored policy.
    #[must_use]
    fn policy(&self) -> DropPolicy;
}

impl Sealed for DropPolicy {}

impl DropPolicyStorage for DropPolicy {
    fn store(policy: DropPolicy) -> Self {
        policy
    }

    fn policy(&self) -> DropPolicy {
        *self
    }
}

/// The drop policy storage of [`Unmanaged`][crate::Unmanaged] containers.
///
/// Always reports [`DropPolicy::MayDropItems`]. Occupies no memory.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NoDropPolicy;

impl Sealed for NoDropPolicy {}

impl DropPolicyStorage for NoDropPolicy {
    fn store(_policy: DropPolicy) -> Self {
        Self
    }

    fn policy(&self) -> DropPolicy {
        DropPolicy::MayDropItems
    }
}
