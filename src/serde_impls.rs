use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use std::fmt::{self, Formatter};

use crate::IntMap;

struct MapVisitor;

impl Serialize for IntMap {
    fn serialize<Sr>(&self, serializer: Sr) -> Result<Sr::Ok, Sr::Error>
    where
        Sr: Serializer,
    {
        serializer.collect_map(self)
    }
}

impl<'de> Deserialize<'de> for IntMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MapVisitor)
    }
}

impl<'de> Visitor<'de> for MapVisitor {
    type Value = IntMap;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "a map of integers to floats")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        // cap the hint, it comes from untrusted input
        let mut values = IntMap::with_capacity(access.size_hint().unwrap_or(0).min(1 << 16));

        while let Some((key, value)) = access.next_entry::<i64, f64>()? {
            values.insert(key, value);
        }

        Ok(values)
    }
}
