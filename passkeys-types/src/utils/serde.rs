//! Utilities to be used in serde derives for more robust (de)serializations.
//!
//! All of these buffer the input through [`serde_json::Value`] first, so a value that fails to
//! parse as `T` never leaves the outer deserializer half consumed.

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;


/// Many WebAuthn dictionary members are defined with the following wording.
///
/// > The values SHOULD be members of `T` but client platforms MUST ignore unknown values.
///
/// This method is a simple way of ignoring unknown values without failing deserialization.
pub(crate) fn ignore_unknown<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(de)?;
    Ok(T::deserialize(raw).unwrap_or_default())
}

/// Same as [`ignore_unknown`] but applied to each element of a list, dropping the elements that
/// are not known.
pub(crate) fn ignore_unknown_vec<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Vec::<Value>::deserialize(de)?;
    Ok(raw
        .into_iter()
        .filter_map(|item| T::deserialize(item).ok())
        .collect())
}

/// Optional version of [`ignore_unknown_vec`], a `null` list is treated as absent.
pub(crate) fn ignore_unknown_opt_vec<'de, D, T>(de: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<Value>>::deserialize(de)?;
    Ok(raw.map(|items| {
        items
            .into_iter()
            .filter_map(|item| T::deserialize(item).ok())
            .collect()
    }))
}

/// Timeouts are sent by some relying parties as floats or as strings. Anything that does not
/// represent a non-negative number within `u32` is treated as absent.
pub(crate) fn maybe_stringified<'de, D>(de: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(de)?;
    let num = match raw {
        Some(Value::Number(num)) => num.as_u64().or_else(|| num.as_f64().and_then(truncate)),
        Some(Value::String(text)) => text
            .trim()
            .parse::<u64>()
            .ok()
            .or_else(|| text.trim().parse::<f64>().ok().and_then(truncate)),
        _ => None,
    };
    Ok(num.and_then(|num| u32::try_from(num).ok()))
}

#[allow(clippy::as_conversions)]
fn truncate(num: f64) -> Option<u64> {
    (num.is_finite() && num >= 0.0 && num <= f64::from(u32::MAX)).then(|| num.trunc() as u64)
}

pub(crate) mod i64_to_iana {
    use coset::iana::EnumI64;

    pub fn serialize<S, T>(value: &T, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
        T: EnumI64,
    {
        ser.serialize_i64(value.to_i64())
    }

    /// Accepts the identifier as a number or as a stringified number.
    pub fn deserialize<'de, D, T>(de: D) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
        T: EnumI64,
    {
        let raw: serde_json::Value = serde::Deserialize::deserialize(de)?;
        let value = match &raw {
            serde_json::Value::Number(num) => num.as_i64(),
            serde_json::Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            <D::Error as serde::de::Error>::invalid_type(
                serde::de::Unexpected::Other("a non integer value"),
                &"An iana::Algorithm value",
            )
        })?;

        T::from_i64(value).ok_or_else(|| {
            <D::Error as serde::de::Error>::invalid_value(
                serde::de::Unexpected::Signed(value),
                &"An iana::Algorithm value",
            )
        })
    }
}
