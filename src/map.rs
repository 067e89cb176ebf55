use crate::raw;

use std::error::Error;
use std::fmt;
use std::iter::FusedIterator;

/// The fill factor used by [`IntMap::with_capacity`] and [`IntMap::default`].
pub const DEFAULT_FILL_FACTOR: f64 = 0.75;

/// A hash map from `i64` keys to `f64` values.
///
/// Entries live directly in flat key, value and occupancy arrays, and
/// collisions are resolved with linear probing. Removal relocates displaced
/// entries instead of leaving tombstones, so lookup cost does not degrade over
/// long insert/remove cycles.
///
/// The map grows whenever the number of entries would exceed
/// `capacity * fill_factor`, and never shrinks.
///
/// Equality compares values with `==`, so a map holding a NaN value is not
/// equal to itself or to its clone.
///
/// # Examples
///
/// ```
/// use probemap::IntMap;
///
/// let mut map = IntMap::new(10, 0.99).unwrap();
/// map.insert(4, 4.0);
/// assert_eq!(map.get(4), Some(4.0));
/// assert_eq!(map.get(5), None);
///
/// map.remove(4);
/// assert_eq!(map.get(4), None);
/// assert_eq!(map.len(), 0);
/// ```
#[derive(Clone)]
pub struct IntMap {
    raw: raw::RawMap,
}

/// A builder for an [`IntMap`].
///
/// # Examples
///
/// ```rust
/// use probemap::IntMap;
///
/// let map = IntMap::builder()
///     // Set the number of entries to hold without resizing.
///     .capacity(2048)
///     // Set the maximum load of the table.
///     .fill_factor(0.6)
///     // Construct the map.
///     .build()
///     .unwrap();
///
/// assert!(map.capacity() >= 2048);
/// ```
#[derive(Clone, Debug)]
pub struct IntMapBuilder {
    capacity: usize,
    fill_factor: f64,
}

impl IntMapBuilder {
    /// Set the initial capacity of the map.
    ///
    /// The map will be able to hold at least `capacity` entries before resizing.
    pub fn capacity(self, capacity: usize) -> IntMapBuilder {
        IntMapBuilder { capacity, ..self }
    }

    /// Set the fill factor of the map, which must lie strictly between 0 and 1.
    ///
    /// The map grows once the ratio of entries to slots would exceed this value.
    /// Lower values trade memory for shorter probe sequences.
    pub fn fill_factor(self, fill_factor: f64) -> IntMapBuilder {
        IntMapBuilder {
            fill_factor,
            ..self
        }
    }

    /// Construct an [`IntMap`] from the builder, using the configured options.
    ///
    /// Returns an error if the fill factor is outside `(0, 1)` or the requested
    /// capacity cannot be allocated.
    pub fn build(self) -> Result<IntMap, ConfigError> {
        // written to reject NaN
        if !(self.fill_factor > 0.0 && self.fill_factor < 1.0) {
            return Err(ConfigError::FillFactor(self.fill_factor));
        }

        let raw = raw::RawMap::new(self.capacity, self.fill_factor)
            .ok_or(ConfigError::CapacityOverflow)?;

        Ok(IntMap { raw })
    }
}

impl Default for IntMapBuilder {
    fn default() -> Self {
        IntMapBuilder {
            capacity: 0,
            fill_factor: DEFAULT_FILL_FACTOR,
        }
    }
}

/// An error returned when an [`IntMap`] is configured incorrectly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// The fill factor was not strictly between 0 and 1.
    FillFactor(f64),
    /// The requested capacity exceeds the largest possible table.
    CapacityOverflow,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FillFactor(fill_factor) => {
                write!(f, "fill factor must be in (0, 1), got {}", fill_factor)
            }
            ConfigError::CapacityOverflow => write!(f, "capacity overflow"),
        }
    }
}

impl Error for ConfigError {}

impl IntMap {
    /// Creates an empty `IntMap` able to hold `capacity` entries without
    /// resizing, growing whenever the load would exceed `fill_factor`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FillFactor`] if `fill_factor` is not strictly
    /// between 0 and 1, and [`ConfigError::CapacityOverflow`] if `capacity`
    /// is too large.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::{ConfigError, IntMap};
    ///
    /// let map = IntMap::new(100, 0.5).unwrap();
    /// assert!(map.is_empty());
    ///
    /// assert_eq!(IntMap::new(100, 1.0).unwrap_err(), ConfigError::FillFactor(1.0));
    /// ```
    pub fn new(capacity: usize, fill_factor: f64) -> Result<IntMap, ConfigError> {
        IntMap::builder()
            .capacity(capacity)
            .fill_factor(fill_factor)
            .build()
    }

    /// Creates an empty `IntMap` with the specified capacity and the
    /// [default fill factor](DEFAULT_FILL_FACTOR).
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows.
    pub fn with_capacity(capacity: usize) -> IntMap {
        IntMap::builder()
            .capacity(capacity)
            .build()
            .expect("capacity overflow")
    }

    /// Returns a builder for an `IntMap`.
    pub fn builder() -> IntMapBuilder {
        IntMapBuilder::default()
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::IntMap;
    ///
    /// let mut map = IntMap::default();
    /// map.insert(1, 0.5);
    /// map.insert(2, 0.25);
    /// assert_eq!(map.len(), 2);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of slots in the underlying table.
    ///
    /// This is always a power of two, and strictly greater than [`len`](IntMap::len).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the fill factor the map was configured with.
    #[inline]
    pub fn fill_factor(&self) -> f64 {
        self.raw.fill_factor()
    }

    /// Returns the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::IntMap;
    ///
    /// let mut map = IntMap::default();
    /// map.insert(-1, 1.5);
    /// assert_eq!(map.get(-1), Some(1.5));
    /// assert_eq!(map.get(2), None);
    /// ```
    #[inline]
    pub fn get(&self, key: i64) -> Option<f64> {
        self.raw.get(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    #[inline]
    pub fn contains_key(&self, key: i64) -> bool {
        self.get(key).is_some()
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::IntMap;
    ///
    /// let mut map = IntMap::default();
    /// map.insert(1, 1.0);
    /// if let Some(x) = map.get_mut(1) {
    ///     *x *= 4.0;
    /// }
    /// assert_eq!(map.get(1), Some(4.0));
    /// ```
    #[inline]
    pub fn get_mut(&mut self, key: i64) -> Option<&mut f64> {
        self.raw.get_mut(key)
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, [`None`] is returned.
    ///
    /// If the map did have this key present, the value is updated, and the old
    /// value is returned.
    ///
    /// Any `i64` is a valid key and any `f64`, including NaN, is a valid value.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::IntMap;
    ///
    /// let mut map = IntMap::default();
    /// assert_eq!(map.insert(37, 1.0), None);
    /// assert_eq!(map.insert(37, 2.0), Some(1.0));
    /// assert_eq!(map.get(37), Some(2.0));
    /// ```
    #[inline]
    pub fn insert(&mut self, key: i64, value: f64) -> Option<f64> {
        self.raw.insert(key, value)
    }

    /// Updates an existing entry with the result of `update`, returning the new
    /// value.
    ///
    /// If the key is not present, the map is unchanged and [`None`] is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::IntMap;
    ///
    /// let mut map = IntMap::default();
    /// map.insert(1, 1.0);
    /// assert_eq!(map.update(1, |v| v + 1.0), Some(2.0));
    /// assert_eq!(map.update(2, |v| v + 1.0), None);
    /// ```
    pub fn update<F>(&mut self, key: i64, update: F) -> Option<f64>
    where
        F: FnOnce(f64) -> f64,
    {
        self.raw.update(key, update)
    }

    /// Updates an existing entry with the result of `update`, or inserts `value`
    /// if the key is absent. Returns the value now in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::IntMap;
    ///
    /// let mut counts = IntMap::default();
    /// for id in [7, 3, 7, 7] {
    ///     counts.update_or_insert(id, |n| n + 1.0, 1.0);
    /// }
    /// assert_eq!(counts.get(7), Some(3.0));
    /// assert_eq!(counts.get(3), Some(1.0));
    /// ```
    pub fn update_or_insert<F>(&mut self, key: i64, update: F, value: f64) -> f64
    where
        F: FnOnce(f64) -> f64,
    {
        self.raw.update_or_insert(key, update, value)
    }

    /// Returns the value for the key, inserting `value` first if it is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::IntMap;
    ///
    /// let mut map = IntMap::default();
    /// assert_eq!(map.get_or_insert(5, 1.0), 1.0);
    /// assert_eq!(map.get_or_insert(5, 2.0), 1.0);
    /// ```
    pub fn get_or_insert(&mut self, key: i64, value: f64) -> f64 {
        self.raw.get_or_insert(key, value)
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    ///
    /// Removing an absent key is a no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::IntMap;
    ///
    /// let mut map = IntMap::default();
    /// map.insert(1, 0.5);
    /// assert_eq!(map.remove(1), Some(0.5));
    /// assert_eq!(map.remove(1), None);
    /// ```
    #[inline]
    pub fn remove(&mut self, key: i64) -> Option<f64> {
        self.raw.remove(key)
    }

    /// Clears the map, removing all entries.
    ///
    /// The allocated capacity is kept.
    pub fn clear(&mut self) {
        self.raw.clear()
    }

    /// Reserves capacity for at least `additional` more entries, so that
    /// inserting them does not resize the table.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows.
    pub fn reserve(&mut self, additional: usize) {
        self.raw.reserve(additional)
    }

    /// An iterator visiting all key-value pairs in arbitrary order.
    ///
    /// Each call starts a fresh pass over the table.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::IntMap;
    ///
    /// let mut map = IntMap::default();
    /// map.insert(1, 0.5);
    /// map.insert(2, 1.0);
    ///
    /// let total: f64 = map.iter().map(|(_, v)| v).sum();
    /// assert_eq!(total, 1.5);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            raw: self.raw.iter(),
        }
    }

    /// An iterator visiting all keys in arbitrary order.
    ///
    /// # Examples
    ///
    /// ```
    /// use probemap::IntMap;
    ///
    /// let mut map = IntMap::default();
    /// map.insert(2, 0.0);
    /// map.insert(1, 0.0);
    ///
    /// let mut keys: Vec<i64> = map.keys().collect();
    /// keys.sort();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    #[inline]
    pub fn keys(&self) -> Keys<'_> {
        Keys {
            raw: self.raw.iter(),
        }
    }

    /// An iterator visiting all values in arbitrary order.
    #[inline]
    pub fn values(&self) -> Values<'_> {
        Values {
            raw: self.raw.iter(),
        }
    }
}

impl Default for IntMap {
    fn default() -> Self {
        IntMap::with_capacity(0)
    }
}

impl PartialEq for IntMap {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }

        self.iter()
            .all(|(key, value)| other.get(key).map_or(false, |v| value == v))
    }
}

impl fmt::Debug for IntMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Extend<(i64, f64)> for IntMap {
    fn extend<T: IntoIterator<Item = (i64, f64)>>(&mut self, iter: T) {
        // Reserve the full hint only when empty: duplicate keys would otherwise
        // leave a table that never shrinks back.
        let iter = iter.into_iter();
        let reserve = if self.is_empty() {
            iter.size_hint().0
        } else {
            (iter.size_hint().0 + 1) / 2
        };
        self.reserve(reserve);

        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a> Extend<(&'a i64, &'a f64)> for IntMap {
    fn extend<T: IntoIterator<Item = (&'a i64, &'a f64)>>(&mut self, iter: T) {
        self.extend(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl FromIterator<(i64, f64)> for IntMap {
    fn from_iter<T: IntoIterator<Item = (i64, f64)>>(iter: T) -> Self {
        let mut map = IntMap::default();
        map.extend(iter);
        map
    }
}

impl<const N: usize> From<[(i64, f64); N]> for IntMap {
    fn from(arr: [(i64, f64); N]) -> Self {
        IntMap::from_iter(arr)
    }
}

impl<'a> IntoIterator for &'a IntMap {
    type Item = (i64, f64);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over a map's entries.
///
/// This struct is created by the [`iter`](IntMap::iter) method on [`IntMap`].
/// See its documentation for details.
#[derive(Clone)]
pub struct Iter<'map> {
    raw: raw::Iter<'map>,
}

impl Iterator for Iter<'_> {
    type Item = (i64, f64);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.raw.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.raw.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}
impl FusedIterator for Iter<'_> {}

impl fmt::Debug for Iter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over a map's keys.
///
/// This struct is created by the [`keys`](IntMap::keys) method on [`IntMap`].
/// See its documentation for details.
#[derive(Clone)]
pub struct Keys<'map> {
    raw: raw::Iter<'map>,
}

impl Iterator for Keys<'_> {
    type Item = i64;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let (key, _) = self.raw.next()?;
        Some(key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.raw.size_hint()
    }
}

impl ExactSizeIterator for Keys<'_> {}
impl FusedIterator for Keys<'_> {}

impl fmt::Debug for Keys<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over a map's values.
///
/// This struct is created by the [`values`](IntMap::values) method on [`IntMap`].
/// See its documentation for details.
#[derive(Clone)]
pub struct Values<'map> {
    raw: raw::Iter<'map>,
}

impl Iterator for Values<'_> {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let (_, value) = self.raw.next()?;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.raw.size_hint()
    }
}

impl ExactSizeIterator for Values<'_> {}
impl FusedIterator for Values<'_> {}

impl fmt::Debug for Values<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
