// The backing storage of a table: three index-aligned arrays.
//
// A slot `i` holds a live entry iff `occupied[i]`; the contents of `keys[i]`
// and `values[i]` are meaningless otherwise. Keeping occupancy out of band means
// no key value is reserved as an empty marker.
#[derive(Clone)]
pub struct Table {
    // Mask for the table length.
    pub mask: usize,
    pub keys: Box<[i64]>,
    pub values: Box<[f64]>,
    pub occupied: Box<[bool]>,
}

impl Table {
    // Allocate a table with the provided length, all slots free.
    //
    // Allocation failure is fatal and aborts through the global allocator.
    pub fn alloc(len: usize) -> Table {
        assert!(len.is_power_of_two());

        Table {
            mask: len - 1,
            keys: vec![0; len].into_boxed_slice(),
            values: vec![0.0; len].into_boxed_slice(),
            occupied: vec![false; len].into_boxed_slice(),
        }
    }

    /// Returns the length of the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.mask + 1
    }

    // Writes an entry into a free slot.
    #[inline]
    pub fn write(&mut self, i: usize, key: i64, value: f64) {
        debug_assert!(!self.occupied[i]);
        self.keys[i] = key;
        self.values[i] = value;
        self.occupied[i] = true;
    }

    // Moves the entry at `from` into the free slot `to`, freeing `from`.
    #[inline]
    pub fn shift(&mut self, from: usize, to: usize) {
        debug_assert!(self.occupied[from] && !self.occupied[to]);
        self.keys[to] = self.keys[from];
        self.values[to] = self.values[from];
        self.occupied[to] = true;
        self.occupied[from] = false;
    }

    // Marks every slot free.
    pub fn clear(&mut self) {
        self.occupied.fill(false);
    }
}

#[test]
fn layout() {
    let table = Table::alloc(4);
    assert_eq!(table.mask, 3);
    assert_eq!(table.len(), 4);
    assert_eq!(table.keys.len(), 4);
    assert_eq!(table.values.len(), 4);
    assert!(table.occupied.iter().all(|&x| !x));
}

#[test]
fn shift() {
    let mut table = Table::alloc(4);
    table.write(1, -9, 2.5);
    table.shift(1, 0);
    assert!(table.occupied[0]);
    assert!(!table.occupied[1]);
    assert_eq!(table.keys[0], -9);
    assert_eq!(table.values[0], 2.5);
}
