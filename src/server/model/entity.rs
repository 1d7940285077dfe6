//! Configured business entity profiles.

use serde::{Deserialize, Serialize};

/// Position of a business entity within the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityClassification {
    Parent,
    Investment,
    Operating,
}

impl EntityClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Investment => "investment",
            Self::Operating => "operating",
        }
    }
}

/// Lifecycle status of a business entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Active,
    Building,
    Planned,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Building => "building",
            Self::Planned => "planned",
        }
    }
}

/// A business entity as declared in the entities configuration file.
///
/// The access token is never part of the profile; `credential_env` names the environment
/// variable the credential registry reads it from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityProfile {
    /// Stable lowercase identifier, e.g. `empire-holdings`
    pub slug: String,
    pub name: String,
    pub legal_name: String,
    pub classification: EntityClassification,
    pub status: EntityStatus,
    pub credential_env: String,
}

impl EntityProfile {
    /// Checks whether a slug is lowercase ASCII letters, digits and single inner hyphens.
    pub fn is_valid_slug(slug: &str) -> bool {
        !slug.is_empty()
            && !slug.starts_with('-')
            && !slug.ends_with('-')
            && !slug.contains("--")
            && slug
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    }
}
