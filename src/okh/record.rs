use serde::{Deserialize, Serialize};

/// Every Appropedia project is published under this license.
pub const LICENSE: &str = "CC-BY-SA 4.0";
/// OKH schema version of the emitted manifests.
pub const OKH_VERSION: &str = "2.0";

/// One author is written as a bare string, several as an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Licensor {
    One(String),
    Many(Vec<String>),
}

impl Licensor {
    /// `None` for an empty list, so a `Many` is never empty.
    pub fn from_authors(mut authors: Vec<String>) -> Option<Self> {
        match authors.len() {
            0 => None,
            1 => authors.pop().map(Licensor::One),
            _ => Some(Licensor::Many(authors)),
        }
    }
}

/// Open technology readiness level. Only the two tiers the Appropedia
/// fields can justify are ever emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessLevel {
    /// Working prototype exists
    #[serde(rename = "OTRL-4")]
    Otrl4,
    /// Made or deployed independently, or otherwise verified
    #[serde(rename = "OTRL-5")]
    Otrl5,
}

/// An OKH v2 manifest as produced from one Appropedia project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OkhRecord {
    pub name: String,
    pub repo: String,
    pub license: String,
    pub okhv: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licensor: Option<Licensor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology_readiness_level: Option<ReadinessLevel>,
}

impl OkhRecord {
    /// A record with only the always-present fields set.
    pub fn new(name: impl Into<String>, repo: impl Into<String>) -> Self {
        OkhRecord {
            name: name.into(),
            repo: repo.into(),
            license: LICENSE.to_string(),
            okhv: OKH_VERSION.to_string(),
            licensor: None,
            image: None,
            function: None,
            documentation_language: None,
            technology_readiness_level: None,
        }
    }
}
