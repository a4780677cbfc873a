//! Lossless Floats - Non-finite Values in Text Encodings
//!
//! JSON has no literal for infinities or NaN. Human-readable encodings carry
//! them as the strings `"inf"`, `"-inf"` and `"NaN"`; binary encodings keep the
//! raw `f64`. Used through `#[serde(with = ...)]` on coordinate fields and
//! float annotations.
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use core::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serializer};

const INF: &str = "inf";
const NEG_INF: &str = "-inf";
const NAN: &str = "NaN";

// =============================================================================
// Single Values
// =============================================================================

pub(crate) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() || !serializer.is_human_readable() {
        return serializer.serialize_f64(*value);
    }
    let text = if value.is_nan() {
        NAN
    } else if value.is_sign_positive() {
        INF
    } else {
        NEG_INF
    };
    serializer.serialize_str(text)
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    if deserializer.is_human_readable() {
        deserializer.deserialize_any(LosslessVisitor)
    } else {
        f64::deserialize(deserializer)
    }
}

struct LosslessVisitor;

impl Visitor<'_> for LosslessVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a number or one of \"{INF}\", \"{NEG_INF}\", \"{NAN}\"")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        match v {
            INF => Ok(f64::INFINITY),
            NEG_INF => Ok(f64::NEG_INFINITY),
            NAN => Ok(f64::NAN),
            _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
        }
    }
}

// =============================================================================
// Sequences
// =============================================================================

/// Per-axis `Vec<f64>` form.
pub(crate) mod seq {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    struct Item(f64);

    impl Serialize for Item {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            super::serialize(&self.0, serializer)
        }
    }

    impl<'de> Deserialize<'de> for Item {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            super::deserialize(deserializer).map(Item)
        }
    }

    pub(crate) fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|&v| Item(v)))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let items = Vec::<Item>::deserialize(deserializer)?;
        Ok(items.into_iter().map(|Item(v)| v).collect())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Coordinates {
        #[serde(with = "super")]
        origin: f64,
        #[serde(with = "super::seq")]
        spacing: Vec<f64>,
    }

    fn sample() -> Coordinates {
        Coordinates {
            origin: f64::NAN,
            spacing: vec![0.5, f64::INFINITY, f64::NEG_INFINITY],
        }
    }

    fn check(back: &Coordinates) {
        assert!(back.origin.is_nan());
        assert_eq!(back.spacing, vec![0.5, f64::INFINITY, f64::NEG_INFINITY]);
    }

    #[test]
    fn test_json_spells_out_non_finite_values() {
        let text = serde_json::to_string(&sample()).unwrap();
        assert_eq!(text, r#"{"origin":"NaN","spacing":[0.5,"inf","-inf"]}"#);
        check(&serde_json::from_str(&text).unwrap());
    }

    #[test]
    fn test_json_accepts_integers() {
        let back: Coordinates = serde_json::from_str(r#"{"origin":3,"spacing":[1]}"#).unwrap();
        assert_eq!(back.origin, 3.0);
        assert_eq!(back.spacing, vec![1.0]);
    }

    #[test]
    fn test_json_rejects_unknown_strings() {
        assert!(serde_json::from_str::<Coordinates>(r#"{"origin":"big","spacing":[]}"#).is_err());
    }
}
