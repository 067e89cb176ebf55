// The smallest table length.
pub const MIN_CAPACITY: usize = 2;

// The largest table length whose widest array stays within `isize::MAX` bytes.
const MAX_CAPACITY: usize = 1 << (usize::BITS - 5);

// Mixes the bits of a key, the splitmix64 finalizer.
//
// Sequential and strided keys are common in numeric workloads, so the low bits
// used for the home slot must depend on every bit of the key.
#[inline]
pub fn hash(key: i64) -> u64 {
    let mut x = key as u64;
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

// Returns the maximum number of entries a table of length `len` may hold.
//
// Always leaves at least one slot free, which is what terminates every probe.
#[inline]
pub fn threshold(len: usize, fill_factor: f64) -> usize {
    debug_assert!(len.is_power_of_two());
    ((len as f64 * fill_factor) as usize).min(len - 1)
}

// Returns the table length needed to hold `entries` without exceeding the fill factor.
pub fn capacity_for(entries: usize, fill_factor: f64) -> Option<usize> {
    let target = (entries as f64 / fill_factor).ceil();
    if !(target <= MAX_CAPACITY as f64) {
        return None;
    }

    let mut len = (target as usize).max(MIN_CAPACITY).checked_next_power_of_two()?;

    // Float rounding can leave the threshold one short.
    while threshold(len, fill_factor) < entries {
        len = len.checked_mul(2).filter(|&len| len <= MAX_CAPACITY)?;
    }

    Some(len)
}

// A linear probe sequence.
//
// Walks `i, i + 1, i + 2, ...`, wrapping around with the table mask.
pub struct Probe {
    // The current index in the probe sequence.
    pub i: usize,
    // Mask for the length of the table.
    mask: usize,
}

impl Probe {
    // Initialize the probe sequence at the home slot of `hash`.
    #[inline]
    pub fn start(hash: u64, len: usize) -> Probe {
        let mask = len - 1;
        Probe {
            i: (hash as usize) & mask,
            mask,
        }
    }

    // Increment the probe sequence.
    #[inline]
    pub fn next(&mut self) {
        self.i = (self.i + 1) & self.mask;
    }
}
