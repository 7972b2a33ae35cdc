//! Ordered oil-analysis feature samples
//!
//! A `Sample` keeps features in insertion order, including when it is
//! deserialized from a JSON object, so the rendered prompt lists the
//! measurements exactly as the caller supplied them.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ReasoningError, Result};

/// One named measurement
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub value: f64,
}

/// Measured feature values for one evaluation instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    features: Vec<Feature>,
}

impl Sample {
    /// Create an empty sample
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sample from ordered name/value pairs
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut sample = Self::new();
        for (name, value) in pairs {
            sample.insert(name, value)?;
        }
        Ok(sample)
    }

    /// Append a feature; names must be unique and values finite
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ReasoningError::malformed_sample("feature name is empty"));
        }
        if !value.is_finite() {
            return Err(ReasoningError::malformed_sample(format!(
                "feature {} has a non-finite value",
                name
            )));
        }
        if self.get(&name).is_some() {
            return Err(ReasoningError::malformed_sample(format!(
                "feature {} appears more than once",
                name
            )));
        }

        self.features.push(Feature { name, value });
        Ok(())
    }

    /// Builder-style `insert`
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Result<Self> {
        self.insert(name, value)?;
        Ok(self)
    }

    /// Value of a feature, if present
    pub fn get(&self, name: &str) -> Option<f64> {
        self.features
            .iter()
            .find(|feature| feature.name == name)
            .map(|feature| feature.value)
    }

    /// Features in insertion order
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Feature names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|feature| feature.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Check that every listed feature is present
    pub fn require(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| self.get(name).is_none())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReasoningError::malformed_sample(format!(
                "missing features: {}",
                missing.join(", ")
            )))
        }
    }

    /// Human-readable rendering used in prompts, e.g. `Fe: 5, Cu: 2`
    pub fn render(&self) -> String {
        self.features
            .iter()
            .map(|feature| format!("{}: {}", feature.name, feature.value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.features.len()))?;
        for feature in &self.features {
            map.serialize_entry(&feature.name, &feature.value)?;
        }
        map.end()
    }
}

struct SampleVisitor;

impl<'de> Visitor<'de> for SampleVisitor {
    type Value = Sample;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object mapping feature names to numbers")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Sample, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut sample = Sample::new();
        while let Some((name, value)) = access.next_entry::<String, f64>()? {
            sample.insert(name, value).map_err(|err| match err {
                ReasoningError::MalformedSample(message) => de::Error::custom(message),
                other => de::Error::custom(other),
            })?;
        }
        Ok(sample)
    }
}

impl<'de> Deserialize<'de> for Sample {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(SampleVisitor)
    }
}
