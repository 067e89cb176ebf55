#![no_main]

use libfuzzer_sys::fuzz_target;

use arbitrary::Arbitrary;
use probemap::IntMap;
use std::collections::HashMap as StdHashMap;

#[derive(Debug, Arbitrary)]
enum Operation {
    Insert(i64, f64),
    Remove(i64),
    Get(i64),
    Contains(i64),
    Clear,
    Len,
    IsEmpty,
    Update(i64, f64),
    UpdateOrInsert(i64, f64, f64),
    GetOrInsert(i64, f64),
    Reserve(u16),
    Iterate,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    // Narrow keys into a small range to produce dense clusters.
    narrow: bool,
    fill_factor: u8,
    operations: Vec<Operation>,
}

// Compare values by bits so that NaN payloads round-trip exactly.
fn bits(value: Option<f64>) -> Option<u64> {
    value.map(f64::to_bits)
}

fn fuzz_intmap(input: FuzzInput) {
    // Map the byte onto (0, 1).
    let fill_factor = (f64::from(input.fill_factor) + 1.0) / 257.0;
    let mut map = IntMap::new(0, fill_factor).unwrap();
    let mut std_map = StdHashMap::new();

    let key = |k: i64| if input.narrow { k % 64 } else { k };

    for op in input.operations {
        match op {
            Operation::Insert(k, v) => {
                let k = key(k);
                assert_eq!(bits(std_map.insert(k, v)), bits(map.insert(k, v)));
            }
            Operation::Remove(k) => {
                let k = key(k);
                assert_eq!(bits(std_map.remove(&k)), bits(map.remove(k)));
            }
            Operation::Get(k) => {
                let k = key(k);
                assert_eq!(bits(std_map.get(&k).copied()), bits(map.get(k)));
            }
            Operation::Contains(k) => {
                let k = key(k);
                assert_eq!(std_map.contains_key(&k), map.contains_key(k));
            }
            Operation::Clear => {
                std_map.clear();
                map.clear();
            }
            Operation::Len => {
                assert_eq!(std_map.len(), map.len());
            }
            Operation::IsEmpty => {
                assert_eq!(std_map.is_empty(), map.is_empty());
            }
            Operation::Update(k, v) => {
                let k = key(k);
                let std_result = std_map.get_mut(&k).map(|e| {
                    *e += v;
                    *e
                });
                assert_eq!(bits(std_result), bits(map.update(k, |e| e + v)));
            }
            Operation::UpdateOrInsert(k, v, default) => {
                let k = key(k);
                let std_result = *std_map
                    .entry(k)
                    .and_modify(|e| *e += v)
                    .or_insert(default);
                let result = map.update_or_insert(k, |e| e + v, default);
                assert_eq!(std_result.to_bits(), result.to_bits());
            }
            Operation::GetOrInsert(k, v) => {
                let k = key(k);
                let std_result = *std_map.entry(k).or_insert(v);
                assert_eq!(std_result.to_bits(), map.get_or_insert(k, v).to_bits());
            }
            Operation::Reserve(additional) => {
                map.reserve(usize::from(additional));
            }
            Operation::Iterate => {
                assert_eq!(map.iter().count(), std_map.len());
                for (k, v) in map.iter() {
                    assert_eq!(bits(std_map.get(&k).copied()), Some(v.to_bits()));
                }
            }
        }
    }

    // Final consistency checks
    for (k, v) in std_map.iter() {
        assert_eq!(Some(v.to_bits()), bits(map.get(*k)));
    }
    assert_eq!(std_map.len(), map.len());
    assert_eq!(std_map.is_empty(), map.is_empty());
}

fuzz_target!(|data: FuzzInput| {
    fuzz_intmap(data);
});
