mod alloc;
mod probe;

use std::mem;

use self::alloc::Table;
use self::probe::Probe;

// An open-addressing hash table from `i64` keys to `f64` values.
//
// Collisions are resolved by linear probing. Deletion uses backward shifting,
// so the table never contains tombstones: a free slot always ends a probe.
#[derive(Clone)]
pub struct RawMap {
    // The backing arrays.
    table: Table,
    // The number of live entries.
    len: usize,
    // The maximum number of entries before the table must grow.
    threshold: usize,
    // The configured load factor, in (0, 1).
    fill_factor: f64,
}

// The result of searching for a key.
enum Slot {
    // The key is stored at this index.
    Occupied(usize),
    // The key is absent, this is the first free slot of its probe sequence.
    Vacant(usize),
}

impl RawMap {
    // Create a table able to hold `capacity` entries without resizing.
    //
    // Returns `None` if the required table length overflows.
    pub fn new(capacity: usize, fill_factor: f64) -> Option<RawMap> {
        debug_assert!(fill_factor > 0.0 && fill_factor < 1.0);

        let len = probe::capacity_for(capacity, fill_factor)?;
        tracing::trace!(capacity = len, fill_factor, "allocating table");

        Some(RawMap {
            table: Table::alloc(len),
            len: 0,
            threshold: probe::threshold(len, fill_factor),
            fill_factor,
        })
    }

    // Returns the number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    // Returns the number of slots in the table.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn fill_factor(&self) -> f64 {
        self.fill_factor
    }

    // Walk the probe sequence of `key` until the key or a free slot.
    //
    // Terminates because the threshold always leaves a free slot.
    #[inline]
    fn find(&self, key: i64) -> Slot {
        let mut probe = Probe::start(probe::hash(key), self.table.len());

        loop {
            // encountered a free slot, the key cannot be further along
            if !self.table.occupied[probe.i] {
                return Slot::Vacant(probe.i);
            }

            if self.table.keys[probe.i] == key {
                return Slot::Occupied(probe.i);
            }

            // the slot contained a different key, keep searching
            probe.next();
        }
    }

    #[inline]
    pub fn get(&self, key: i64) -> Option<f64> {
        match self.find(key) {
            Slot::Occupied(i) => Some(self.table.values[i]),
            Slot::Vacant(_) => None,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, key: i64) -> Option<&mut f64> {
        match self.find(key) {
            Slot::Occupied(i) => Some(&mut self.table.values[i]),
            Slot::Vacant(_) => None,
        }
    }

    // Insert or overwrite an entry, returning the previous value.
    #[inline]
    pub fn insert(&mut self, key: i64, value: f64) -> Option<f64> {
        match self.find(key) {
            Slot::Occupied(i) => Some(mem::replace(&mut self.table.values[i], value)),
            Slot::Vacant(i) => {
                self.insert_at(i, key, value);
                None
            }
        }
    }

    // Replace the value of an existing entry with `f(value)`.
    pub fn update<F>(&mut self, key: i64, f: F) -> Option<f64>
    where
        F: FnOnce(f64) -> f64,
    {
        match self.find(key) {
            Slot::Occupied(i) => {
                let value = &mut self.table.values[i];
                *value = f(*value);
                Some(*value)
            }
            Slot::Vacant(_) => None,
        }
    }

    pub fn update_or_insert<F>(&mut self, key: i64, f: F, default: f64) -> f64
    where
        F: FnOnce(f64) -> f64,
    {
        match self.find(key) {
            Slot::Occupied(i) => {
                let value = &mut self.table.values[i];
                *value = f(*value);
                *value
            }
            Slot::Vacant(i) => {
                self.insert_at(i, key, default);
                default
            }
        }
    }

    pub fn get_or_insert(&mut self, key: i64, value: f64) -> f64 {
        match self.find(key) {
            Slot::Occupied(i) => self.table.values[i],
            Slot::Vacant(i) => {
                self.insert_at(i, key, value);
                value
            }
        }
    }

    // Write a new entry into the vacant slot `i`, growing the table if the
    // threshold is crossed.
    #[inline]
    fn insert_at(&mut self, i: usize, key: i64, value: f64) {
        self.table.write(i, key, value);
        self.len += 1;

        if self.len > self.threshold {
            self.grow();
        }
    }

    // Remove an entry, returning its value.
    pub fn remove(&mut self, key: i64) -> Option<f64> {
        match self.find(key) {
            Slot::Occupied(i) => {
                let value = self.table.values[i];
                self.table.occupied[i] = false;
                self.len -= 1;
                self.backshift(i);
                Some(value)
            }
            Slot::Vacant(_) => None,
        }
    }

    // Close the gap left at `hole` by a removal.
    //
    // Scans forward over the cluster following the hole. An entry moves back
    // into the hole iff the hole lies on the probe path from its home slot to
    // its current slot; the entry's old slot then becomes the hole. Entries whose
    // path does not cross the hole stay put and the scan continues past them.
    // The first free slot ends the cluster.
    fn backshift(&mut self, mut hole: usize) {
        let mask = self.table.mask;
        let mut i = (hole + 1) & mask;

        while self.table.occupied[i] {
            let home = (probe::hash(self.table.keys[i]) as usize) & mask;

            // distances measured in probe order, accounting for wraparound
            let from_home = i.wrapping_sub(home) & mask;
            let from_hole = i.wrapping_sub(hole) & mask;

            if from_home >= from_hole {
                self.table.shift(i, hole);
                hole = i;
            }

            i = (i + 1) & mask;
        }
    }

    // Remove all entries, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.table.clear();
        self.len = 0;
    }

    // Reserve room for at least `additional` more entries without resizing.
    pub fn reserve(&mut self, additional: usize) {
        let entries = self.len.checked_add(additional).expect("capacity overflow");
        if entries <= self.threshold {
            return;
        }

        let len = probe::capacity_for(entries, self.fill_factor).expect("capacity overflow");
        self.resize(len);
    }

    // Grow the table after the threshold was crossed, at least doubling it.
    #[cold]
    #[inline(never)]
    fn grow(&mut self) {
        let len = probe::capacity_for(self.len, self.fill_factor)
            .and_then(|len| Some(len.max(self.table.len().checked_mul(2)?)))
            .expect("capacity overflow");

        self.resize(len);
    }

    // Rehash every live entry into a new table of length `len`.
    fn resize(&mut self, len: usize) {
        debug_assert!(len > self.table.len());

        let mut table = Table::alloc(len);

        for (key, value) in self.iter() {
            // keys are unique, so the first free slot is the destination
            let mut probe = Probe::start(probe::hash(key), len);
            while table.occupied[probe.i] {
                probe.next();
            }

            table.write(probe.i, key, value);
        }

        tracing::debug!(from = self.table.len(), to = len, len = self.len, "resized table");

        self.table = table;
        self.threshold = probe::threshold(len, self.fill_factor);
    }

    // Returns an iterator over the live entries, in slot order.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            table: &self.table,
            i: 0,
            remaining: self.len,
        }
    }
}

// An iterator over the live entries of a table.
#[derive(Clone)]
pub struct Iter<'a> {
    table: &'a Table,
    // The next slot to inspect.
    i: usize,
    // The number of live entries not yet yielded.
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = (i64, f64);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        // `remaining` counts occupied slots at or after `i`, so this stays in bounds
        while !self.table.occupied[self.i] {
            self.i += 1;
        }

        let i = self.i;
        self.i += 1;
        self.remaining -= 1;

        Some((self.table.keys[i], self.table.values[i]))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
impl RawMap {
    // Returns the home slot of a key in the current table.
    fn home(&self, key: i64) -> usize {
        (probe::hash(key) as usize) & self.table.mask
    }

    // Returns the slot holding `key`, if any.
    fn slot_of(&self, key: i64) -> Option<usize> {
        match self.find(key) {
            Slot::Occupied(i) => Some(i),
            Slot::Vacant(_) => None,
        }
    }

    // Panics if any structural invariant of the table is broken.
    fn check_invariants(&self) {
        let len = self.table.len();
        assert!(len.is_power_of_two() && len >= probe::MIN_CAPACITY);
        assert_eq!(self.table.keys.len(), len);
        assert_eq!(self.table.values.len(), len);
        assert_eq!(self.table.occupied.len(), len);

        let live = self.table.occupied.iter().filter(|&&x| x).count();
        assert_eq!(live, self.len);
        assert!(self.len <= self.threshold);
        assert!(self.threshold < len);

        // no free slot between any key's home slot and its actual slot
        for i in 0..len {
            if !self.table.occupied[i] {
                continue;
            }

            let mut j = self.home(self.table.keys[i]);
            while j != i {
                assert!(self.table.occupied[j], "hole at {j} before key in slot {i}");
                j = (j + 1) & self.table.mask;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::prelude::*;
    use std::collections::HashMap;

    // Returns `n` distinct keys whose home slot is `home` in a table of length `len`.
    fn colliding(home: usize, len: usize, n: usize) -> Vec<i64> {
        (0..)
            .filter(|&key| (probe::hash(key) as usize) & (len - 1) == home)
            .take(n)
            .collect()
    }

    // A table with 16 slots that will not grow below 14 entries.
    fn table() -> RawMap {
        let map = RawMap::new(8, 0.9).unwrap();
        assert_eq!(map.capacity(), 16);
        map
    }

    #[test]
    fn new_sizes() {
        let map = RawMap::new(10, 0.99).unwrap();
        assert_eq!(map.capacity(), 16);
        assert_eq!(map.len(), 0);
        map.check_invariants();

        let map = RawMap::new(0, 0.5).unwrap();
        assert_eq!(map.capacity(), probe::MIN_CAPACITY);

        assert!(RawMap::new(usize::MAX, 0.5).is_none());
    }

    #[test]
    fn cluster_delete_middle() {
        let mut map = table();
        let keys = colliding(3, 16, 5);

        for &key in &keys {
            map.insert(key, key as f64);
        }
        for (n, &key) in keys.iter().enumerate() {
            assert_eq!(map.slot_of(key), Some(3 + n));
        }

        assert_eq!(map.remove(keys[2]), Some(keys[2] as f64));
        map.check_invariants();

        assert_eq!(map.get(keys[2]), None);
        for &key in keys.iter().filter(|&&key| key != keys[2]) {
            assert_eq!(map.get(key), Some(key as f64));
        }

        // the tail of the cluster shifted back by one
        assert_eq!(map.slot_of(keys[3]), Some(5));
        assert_eq!(map.slot_of(keys[4]), Some(6));
        assert!(!map.table.occupied[7]);
    }

    #[test]
    fn cluster_wraps_around() {
        let mut map = table();
        let keys = colliding(15, 16, 4);

        for &key in &keys {
            map.insert(key, -(key as f64));
        }
        assert_eq!(map.slot_of(keys[0]), Some(15));
        assert_eq!(map.slot_of(keys[1]), Some(0));
        assert_eq!(map.slot_of(keys[3]), Some(2));

        map.remove(keys[0]);
        map.check_invariants();

        assert_eq!(map.slot_of(keys[1]), Some(15));
        assert_eq!(map.slot_of(keys[2]), Some(0));
        assert_eq!(map.slot_of(keys[3]), Some(1));
        assert!(!map.table.occupied[2]);

        for &key in &keys[1..] {
            assert_eq!(map.get(key), Some(-(key as f64)));
        }
    }

    #[test]
    fn shift_across_mixed_homes() {
        let mut map = table();
        let a = colliding(14, 16, 2);
        let b = colliding(15, 16, 2);
        let c = colliding(0, 16, 1);

        // slots 14, 15 | 0, 1 | 2
        for &key in a.iter().chain(&b).chain(&c) {
            map.insert(key, 1.0);
        }
        assert_eq!(map.slot_of(c[0]), Some(2));

        map.remove(a[0]);
        map.check_invariants();

        assert_eq!(map.slot_of(a[1]), Some(14));
        assert_eq!(map.slot_of(b[0]), Some(15));
        assert_eq!(map.slot_of(b[1]), Some(0));
        assert_eq!(map.slot_of(c[0]), Some(1));
        assert!(!map.table.occupied[2]);
    }

    #[test]
    fn shift_skips_entries_at_home() {
        let mut map = table();
        let a = colliding(3, 16, 2);
        let b = colliding(4, 16, 1);

        // a[0] at 3, b[0] at its home 4, a[1] displaced to 5
        map.insert(a[0], 0.0);
        map.insert(b[0], 1.0);
        map.insert(a[1], 2.0);
        assert_eq!(map.slot_of(a[1]), Some(5));

        map.remove(a[0]);
        map.check_invariants();

        assert_eq!(map.slot_of(a[1]), Some(3));
        assert_eq!(map.slot_of(b[0]), Some(4));
        assert!(!map.table.occupied[5]);
        assert_eq!(map.get(a[1]), Some(2.0));
        assert_eq!(map.get(b[0]), Some(1.0));
    }

    #[test]
    fn remove_then_reinsert_through_cluster() {
        let mut map = table();
        let keys = colliding(7, 16, 6);

        for &key in &keys {
            map.insert(key, 0.0);
        }

        for &key in &keys {
            map.remove(key);
            map.check_invariants();
            map.insert(key, 1.0);
            map.check_invariants();
        }

        assert_eq!(map.len(), keys.len());
        for &key in &keys {
            assert_eq!(map.get(key), Some(1.0));
        }
    }

    #[test]
    fn grow_preserves_entries() {
        let mut map = RawMap::new(0, 0.75).unwrap();
        let mut capacity = map.capacity();
        let mut resizes = 0;

        for key in -5000..5000 {
            map.insert(key * 7, key as f64);
            if map.capacity() != capacity {
                assert!(map.capacity() >= capacity * 2);
                capacity = map.capacity();
                resizes += 1;
            }
        }

        map.check_invariants();
        assert!(resizes > 5);
        assert_eq!(map.len(), 10_000);
        for key in -5000..5000 {
            assert_eq!(map.get(key * 7), Some(key as f64));
        }
    }

    #[test]
    fn small_fill_factor_grows_enough() {
        let mut map = RawMap::new(0, 0.05).unwrap();
        for key in 0..100 {
            map.insert(key, 0.0);
            map.check_invariants();
        }
    }

    #[test]
    fn reserve_avoids_resizes() {
        let mut map = RawMap::new(0, 0.6).unwrap();
        map.reserve(1000);
        let capacity = map.capacity();
        assert!(probe::threshold(capacity, 0.6) >= 1000);

        for key in 0..1000 {
            map.insert(key, 0.0);
        }
        assert_eq!(map.capacity(), capacity);

        // already large enough
        map.reserve(0);
        assert_eq!(map.capacity(), capacity);
    }

    #[test]
    fn iter_yields_live_entries() {
        let mut map = table();
        assert_eq!(map.iter().next(), None);

        for key in 0..10 {
            map.insert(key, key as f64 * 0.5);
        }
        map.remove(4);

        let iter = map.iter();
        assert_eq!(iter.size_hint(), (9, Some(9)));

        let mut entries: Vec<_> = iter.collect();
        entries.sort_by_key(|&(key, _)| key);
        let expected: Vec<_> = (0..10)
            .filter(|&key| key != 4)
            .map(|key| (key, key as f64 * 0.5))
            .collect();
        assert_eq!(entries, expected);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut map = table();
        for key in 0..10 {
            map.insert(key, 0.0);
        }

        map.clear();
        map.check_invariants();
        assert_eq!(map.len(), 0);
        assert_eq!(map.capacity(), 16);
        assert_eq!(map.get(3), None);
    }

    #[test]
    fn random_operations() {
        const OPERATIONS: usize = if cfg!(miri) { 500 } else { 20_000 };

        let mut rng = StdRng::seed_from_u64(0x5eed);

        for fill_factor in [0.3, 0.75, 0.99] {
            let mut map = RawMap::new(0, fill_factor).unwrap();
            let mut reference = HashMap::new();

            for _ in 0..OPERATIONS {
                // a small key space keeps clusters dense and removals frequent
                let key = rng.gen_range(-64..64);
                match rng.gen_range(0..3) {
                    0 => {
                        let value = rng.gen::<f64>();
                        assert_eq!(map.insert(key, value), reference.insert(key, value));
                    }
                    1 => assert_eq!(map.remove(key), reference.remove(&key)),
                    _ => assert_eq!(map.get(key), reference.get(&key).copied()),
                }
                map.check_invariants();
            }

            assert_eq!(map.len(), reference.len());
            for (key, value) in map.iter() {
                assert_eq!(reference.get(&key), Some(&value));
            }
        }
    }
}
