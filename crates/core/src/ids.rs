#![forbid(unsafe_code)]

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const MAX_ID_LEN: usize = 256;

/// Opaque category identifier.
///
/// The backend may hand out either strings or integers; both are kept as
/// their canonical text so equality is the only operation that matters.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, IdError> {
        validate_id(value.into()).map(Self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductId(String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, IdError> {
        validate_id(value.into()).map(Self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("id must not be empty")]
    Empty,
    #[error("id is too long")]
    TooLong,
    #[error("id contains control characters")]
    ContainsControl,
}

impl IdError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "ID_EMPTY",
            Self::TooLong => "ID_TOO_LONG",
            Self::ContainsControl => "ID_CONTROL_CHARS",
        }
    }
}

fn validate_id(value: String) -> Result<String, IdError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty);
    }
    if trimmed.len() > MAX_ID_LEN {
        return Err(IdError::TooLong);
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(IdError::ContainsControl);
    }
    if trimmed.len() == value.len() {
        Ok(value)
    } else {
        Ok(trimmed.to_string())
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wire shape of an id: the API is not consistent about quoting.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Signed(i64),
    Unsigned(u64),
    Text(String),
}

impl RawId {
    fn into_text(self) -> String {
        match self {
            Self::Signed(value) => value.to_string(),
            Self::Unsigned(value) => value.to_string(),
            Self::Text(value) => value,
        }
    }
}

macro_rules! opaque_id_serde {
    ($ty:ident) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = RawId::deserialize(deserializer)?.into_text();
                $ty::try_new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

opaque_id_serde!(CategoryId);
opaque_id_serde!(ProductId);

/// Deserializes an optional parent reference. `null`, a missing field and a
/// blank string all mean "no parent".
pub fn deserialize_optional_category_id<'de, D>(
    deserializer: D,
) -> Result<Option<CategoryId>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<RawId>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let text = raw.into_text();
    if text.trim().is_empty() {
        return Ok(None);
    }
    CategoryId::try_new(text)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_id_validation() {
        assert_eq!(CategoryId::try_new("").unwrap_err(), IdError::Empty);
        assert_eq!(CategoryId::try_new("   ").unwrap_err(), IdError::Empty);
        assert_eq!(
            CategoryId::try_new("bad\u{0007}id").unwrap_err(),
            IdError::ContainsControl
        );
        assert_eq!(
            CategoryId::try_new("x".repeat(MAX_ID_LEN + 1)).unwrap_err(),
            IdError::TooLong
        );
        assert_eq!(CategoryId::try_new(" 42 ").unwrap().as_str(), "42");
    }

    #[test]
    fn numeric_and_text_ids_compare_by_text() {
        let from_int: CategoryId = serde_json::from_str("7").unwrap();
        let from_text: CategoryId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(from_int, from_text);
        assert_eq!(serde_json::to_string(&from_int).unwrap(), "\"7\"");
    }
}
