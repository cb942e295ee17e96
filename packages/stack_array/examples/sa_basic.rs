//! Basic usage of the `stack_array` crate:
//!
//! * Creating an array in each management mode.
//! * Constructing, reading, moving out and destroying elements.
//! * Materializing default values with a custom policy.
//! * Observing element lifetimes with a probe.

use stack_array::{
    ElementLifetime, ManagedStackArray, Probe, RawElementLifetime, SafeStackArray, SharedCounter,
    UnmanagedStackArray, default_policy,
};

default_policy!(
    /// Fills empty slots with a placeholder name.
    Anonymous: String = "anonymous".to_string()
);

fn main() {
    // A managed array tracks which slots hold a value and cleans up after itself.
    let mut names = ManagedStackArray::<String, 8, Anonymous>::new();

    names.move_to(0, "Alice".to_string());
    names.create_at(1, || "Bob".to_string());

    // Writing to a live slot destroys the previous value first.
    names.copy_to(1, &"Charlie".to_string());

    println!("Slot 0: {}", names.const_ref_from(0));
    println!("Slot 1: {}", names.const_ref_from(1));

    // Slot 2 was never written, so reading it materializes a value from the policy.
    println!("Slot 2: {}", names.const_ref_from(2));

    let alice = names.move_from(0);
    println!("Moved out {alice}, {} elements remain live", names.live_count());

    // Non-materializing reads report empty slots instead of filling them.
    match names.try_get(5) {
        Ok(name) => println!("Slot 5: {name}"),
        Err(error) => println!("Slot 5: {error}"),
    }

    // A bounds-checked array validates every index before doing anything else.
    let mut scores = SafeStackArray::<u32, 4>::new();
    *scores.ref_from(3) += 10;
    println!("Score in last slot: {}", scores.copy_from(3));

    // An unmanaged array does no bookkeeping at all, so every indexed operation is unsafe.
    let mut raw = UnmanagedStackArray::<Vec<u8>, 4>::new();

    // SAFETY: Index 2 is in bounds.
    unsafe {
        raw.create_at(2, || vec![1, 2, 3]);
    }

    // SAFETY: Index 2 is in bounds and holds a live value that nothing else will drop.
    let bytes = unsafe { raw.move_from(2) };
    println!("Took {bytes:?} out of the unmanaged array");

    // Probes report how many times the array constructed and destroyed elements.
    let counter = SharedCounter::new();

    {
        let mut probes = ManagedStackArray::<Probe<u32, SharedCounter>, 4>::new();

        probes.move_to(0, Probe::new(1, counter.clone()));
        probes.move_to(0, Probe::new(2, counter.clone()));
        probes.move_to(3, Probe::new(3, counter.clone()));
    }

    println!("Probe lifetimes: {:?}", counter.counts());
}
