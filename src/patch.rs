use serde::{Deserialize, Deserializer};

/// A field in a partial update payload.
///
/// Use with `#[serde(default)]` so that a key missing from the JSON object
/// becomes [`Patch::Absent`], while an explicit `null` becomes [`Patch::Null`].
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

impl<T> Patch<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Required fields cannot be cleared; `Null` leaves them untouched.
    pub fn apply_required(self, slot: &mut T) {
        if let Patch::Value(value) = self {
            *slot = value;
        }
    }

    pub fn apply_optional(self, slot: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *slot = None,
            Patch::Value(value) => *slot = Some(value),
        }
    }
}
