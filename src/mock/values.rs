//! Value generators for mock instances
//!
//! Resolution is layered: an exact property-name override wins, then a
//! per-type override, then the built-in default for the primitive. A
//! property whose type resolves to none of the three is a fatal
//! `MissingValueGenerator`.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::Rng;
use serde_json::{json, Value};

use crate::error::{GeneratorError, Result};
use crate::schema::PrimitiveType;

/// A closure producing one JSON value from the shared rng
pub type ValueFn = Box<dyn Fn(&mut StdRng) -> Value + Send + Sync>;

/// Layered registry of value generators
pub struct ValueRegistry {
    by_name: HashMap<String, ValueFn>,
    by_type: HashMap<PrimitiveType, ValueFn>,
}

impl ValueRegistry {
    /// A registry with no generators at all. Every lookup fails until
    /// overrides are registered.
    pub fn empty() -> Self {
        Self {
            by_name: HashMap::new(),
            by_type: HashMap::new(),
        }
    }

    /// The built-in defaults, one generator per supported primitive
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register_type(PrimitiveType::Text, Box::new(random_word));
        registry.register_type(PrimitiveType::Boolean, Box::new(|rng| json!(rng.gen_bool(0.5))));
        registry.register_type(PrimitiveType::Int32, Box::new(random_int));
        registry.register_type(PrimitiveType::Int64, Box::new(random_int));
        registry.register_type(PrimitiveType::Float32, Box::new(random_float));
        registry.register_type(PrimitiveType::Float64, Box::new(random_float));
        registry.register_type(PrimitiveType::Date, Box::new(random_date));
        registry.register_type(PrimitiveType::Timestamp, Box::new(random_timestamp));
        registry.register_type(PrimitiveType::Json, Box::new(|rng| {
            json!({"value": rng.gen_range(0..1_000)})
        }));
        registry.register_type(
            PrimitiveType::TimeSeriesRef,
            Box::new(|rng| resource_id("timeseries", rng)),
        );
        registry.register_type(
            PrimitiveType::FileRef,
            Box::new(|rng| resource_id("file", rng)),
        );
        registry.register_type(
            PrimitiveType::SequenceRef,
            Box::new(|rng| resource_id("sequence", rng)),
        );
        registry
    }

    /// Override the generator for one exact property name
    pub fn register_name(&mut self, name: impl Into<String>, generator: ValueFn) {
        self.by_name.insert(name.into(), generator);
    }

    /// Override the generator for every property of a primitive type
    pub fn register_type(&mut self, primitive: PrimitiveType, generator: ValueFn) {
        self.by_type.insert(primitive, generator);
    }

    /// Produce one value for the named property
    pub fn value(
        &self,
        rng: &mut StdRng,
        property_name: &str,
        primitive: PrimitiveType,
    ) -> Result<Value> {
        if let Some(generator) = self.by_name.get(property_name) {
            return Ok(generator(rng));
        }
        if let Some(generator) = self.by_type.get(&primitive) {
            return Ok(generator(rng));
        }
        Err(GeneratorError::MissingValueGenerator {
            property: property_name.to_string(),
            type_name: primitive.as_str().to_string(),
        })
    }
}

impl Default for ValueRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn random_word(rng: &mut StdRng) -> Value {
    let word: String = (0..8)
        .map(|_| char::from(b'a' + rng.gen_range(0..26u8)))
        .collect();
    json!(word)
}

fn random_int(rng: &mut StdRng) -> Value {
    json!(rng.gen_range(0..1_000))
}

fn random_float(rng: &mut StdRng) -> Value {
    let scaled = (rng.gen::<f64>() * 1_000.0 * 100.0).round() / 100.0;
    json!(scaled)
}

fn random_date(rng: &mut StdRng) -> Value {
    let year = rng.gen_range(1990..2030);
    let month = rng.gen_range(1..=12u32);
    let day = rng.gen_range(1..=28u32);
    let date = chrono::NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    json!(date.format("%Y-%m-%d").to_string())
}

fn random_timestamp(rng: &mut StdRng) -> Value {
    // 2000-01-01 .. ~2033 in seconds
    let seconds = rng.gen_range(946_684_800..2_000_000_000i64);
    let stamp = chrono::DateTime::from_timestamp(seconds, 0)
        .unwrap_or_else(chrono::Utc::now);
    json!(stamp.to_rfc3339())
}

fn resource_id(kind: &str, rng: &mut StdRng) -> Value {
    json!(format!("{}_{:08x}", kind, rng.gen::<u32>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn test_defaults_cover_every_supported_primitive() {
        let registry = ValueRegistry::with_defaults();
        let mut r = rng();
        for primitive in [
            PrimitiveType::Text,
            PrimitiveType::Boolean,
            PrimitiveType::Int32,
            PrimitiveType::Int64,
            PrimitiveType::Float32,
            PrimitiveType::Float64,
            PrimitiveType::Date,
            PrimitiveType::Timestamp,
            PrimitiveType::Json,
            PrimitiveType::TimeSeriesRef,
            PrimitiveType::FileRef,
            PrimitiveType::SequenceRef,
        ] {
            registry.value(&mut r, "anything", primitive).unwrap();
        }
    }

    #[test]
    fn test_name_override_beats_type_default() {
        let mut registry = ValueRegistry::with_defaults();
        registry.register_name("name", Box::new(|_| json!("fixed")));
        let value = registry.value(&mut rng(), "name", PrimitiveType::Text).unwrap();
        assert_eq!(value, json!("fixed"));
    }

    #[test]
    fn test_empty_registry_reports_the_gap() {
        let registry = ValueRegistry::empty();
        let err = registry
            .value(&mut rng(), "age", PrimitiveType::Int32)
            .unwrap_err();
        assert!(matches!(err, GeneratorError::MissingValueGenerator { .. }));
    }

    #[test]
    fn test_date_values_parse() {
        let registry = ValueRegistry::with_defaults();
        let value = registry.value(&mut rng(), "born", PrimitiveType::Date).unwrap();
        let text = value.as_str().unwrap();
        chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap();
    }
}
