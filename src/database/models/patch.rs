use serde::{Deserialize, Deserializer};

/// A field in a partial update.
///
/// `Absent` means the request did not mention the field and the stored value
/// is kept. `Present` carries the new value, which for nullable columns is an
/// `Option` so that an explicit `null` clears the column instead of being
/// mistaken for "not sent".
///
/// Fields must be annotated with `#[serde(default)]` so a missing key
/// deserializes to `Absent`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Present(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Present(value) => Patch::Present(value),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Patch::Absent => None,
            Patch::Present(value) => Some(value),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Present(value) => Patch::Present(f(value)),
        }
    }

    /// Overwrites `target` when the field was sent.
    pub fn apply_to(self, target: &mut T) {
        if let Patch::Present(value) = self {
            *target = value;
        }
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Present(value)
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
        T::deserialize(deserializer).map(Patch::Present)
    }
}
