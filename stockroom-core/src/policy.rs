use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the import path treats malformed numeric cells.
///
/// `Lenient` coerces them to zero and keeps the row. `Strict` rejects the
/// whole upload and reports every row-level issue before anything is
/// written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    Strict,
    #[default]
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown validation policy '{0}', expected 'strict' or 'lenient'")]
pub struct ParsePolicyError(pub String);

impl FromStr for ValidationPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidationPolicy::Strict),
            "lenient" => Ok(ValidationPolicy::Lenient),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

impl fmt::Display for ValidationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationPolicy::Strict => write!(f, "strict"),
            ValidationPolicy::Lenient => write!(f, "lenient"),
        }
    }
}
