#![allow(dead_code)]

use probemap::IntMap;

// Run the test on different configurations of an `IntMap`.
pub fn with_map(mut test: impl FnMut(&dyn Fn() -> IntMap)) {
    // A nearly full table, to stress long clusters.
    test(&(|| IntMap::new(10, 0.99).unwrap()));

    // The default configuration.
    test(&(|| IntMap::default()));

    // A sparse table that resizes often.
    test(&(|| IntMap::new(0, 0.3).unwrap()));

    // A pre-sized table that should not have to resize.
    if !cfg!(miri) {
        test(&(|| IntMap::new(1 << 16, 0.6).unwrap()));
    }
}

// Prints a log message if `RUST_LOG=debug` is set.
#[macro_export]
macro_rules! debug {
    ($($x:tt)*) => {
        if std::env::var("RUST_LOG").as_deref() == Ok("debug") {
            println!($($x)*);
        }
    };
}

// Scales a test size for the current configuration.
pub fn scale(n: usize) -> usize {
    if cfg!(miri) {
        (n / 1000).max(8)
    } else if cfg!(probemap_stress) {
        n * 10
    } else {
        n
    }
}
