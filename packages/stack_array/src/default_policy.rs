/// Produces the value that a container materializes in a slot when it needs an element and the
/// caller did not supply one.
///
/// Containers take their default-construction policy as a type parameter. The policy is used by
/// `create_default_at()` and, in tracked modes, by every read that finds its slot empty.
///
/// Use [`UseDefault`] to delegate to [`Default`], or declare a policy that produces a fixed value
/// with [`default_policy!`][crate::default_policy] when the element type has no [`Default`]
/// implementation (or when the container needs a different default than the type's own).
///
/// A container whose policy does not implement `DefaultFactory` for its element type can still
/// be written to and read from non-materializing accessors; the materializing operations simply
/// do not exist for it, which is reported at compile time.
///
/// # Examples
///
/// ```
/// use stack_array::{DefaultFactory, ElementLifetime, ManagedStackArray};
///
/// struct Sentinel;
///
/// impl DefaultFactory<i32> for Sentinel {
///     fn make_default() -> i32 {
///         -1
///     }
/// }
///
/// let mut array = ManagedStackArray::<i32, 4, Sentinel>::new();
///
/// assert_eq!(*array.const_ref_from(2), -1);
/// ```
pub trait DefaultFactory<T> {
    /// Creates a new default value.
    #[must_use]
    fn make_default() -> T;
}

/// Default-construction policy that delegates to the [`Default`] implementation of the element.
///
/// This is the policy containers use unless told otherwise.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct UseDefault;

impl<T: Default> DefaultFactory<T> for UseDefault {
    fn make_default() -> T {
        T::default()
    }
}

/// Declares a zero-sized default-construction policy type that always produces the same value.
///
/// The expression is evaluated anew every time a default element is needed, so it may call
/// constructors that take a fixed argument list.
///
/// # Examples
///
/// ```
/// use stack_array::{ElementLifetime, ManagedStackArray, default_policy};
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Point {
///     fn new(x: i32, y: i32) -> Self {
///         Self { x, y }
///     }
/// }
///
/// default_policy!(
///     /// Materializes missing points at the origin.
///     Origin: Point = Point::new(0, 0)
/// );
///
/// let mut points = ManagedStackArray::<Point, 8, Origin>::new();
///
/// assert_eq!(*points.const_ref_from(3), Point::new(0, 0));
/// ```
#[macro_export]
macro_rules! default_policy {
    ($(#[$meta:meta])* $vis:vis $name:ident : $item:ty = $value:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
        $vis struct $name;

        impl $crate::DefaultFactory<$item> for $name {
            fn make_default() -> $item {
                $value
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_default_delegates_to_default() {
        assert_eq!(<UseDefault as DefaultFactory<u64>>::make_default(), 0);
        assert_eq!(
            <UseDefault as DefaultFactory<String>>::make_default(),
            String::new()
        );
    }

    default_policy!(FortyTwo: u32 = 42);

    default_policy!(Greeting: String = "hello".to_string());

    #[test]
    fn declared_policy_produces_fixed_value() {
        assert_eq!(<FortyTwo as DefaultFactory<u32>>::make_default(), 42);
        assert_eq!(<FortyTwo as DefaultFactory<u32>>::make_default(), 42);
    }

    #[test]
    fn declared_policy_evaluates_expression_each_time() {
        let mut first = <Greeting as DefaultFactory<String>>::make_default();
        first.push_str(", world");

        assert_eq!(<Greeting as DefaultFactory<String>>::make_default(), "hello");
    }
}
