//! Serde adapter for PATCH fields that can be cleared.
//!
//! Used on `Option<Option<T>>` with
//! `#[serde(default, deserialize_with = "shared::patch::nullable", skip_serializing_if = "Option::is_none")]`:
//! a missing key stays `None`, an explicit `null` becomes `Some(None)` and a
//! value becomes `Some(Some(v))`. `Some(None)` serializes back to `null`.

use serde::{Deserialize, Deserializer};

pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
