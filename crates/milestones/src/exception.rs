//! Exception codes and the catalog they are drawn from.
//!
//! An exception code justifies a milestone gap that reached the business-day
//! threshold. Codes are grouped under a global cause (`causaGlobal`), each
//! group listing its specific causes (`causaPuntual`).

use {
    serde::{Deserialize, Deserializer, Serialize},
    serde_json::Value,
    serde_with::{DeserializeFromStr, SerializeDisplay},
    std::{collections::HashMap, fmt, path::Path, str::FromStr},
};

/// Two uppercase ASCII letters followed by two ASCII digits, e.g. `AA01`.
#[derive(
    Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, DeserializeFromStr, SerializeDisplay,
)]
pub struct ExceptionCode(String);

impl ExceptionCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid exception code {0:?}, expected two uppercase letters and two digits")]
pub struct InvalidExceptionCode(pub String);

impl FromStr for ExceptionCode {
    type Err = InvalidExceptionCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let valid = bytes.len() == 4
            && bytes[..2].iter().all(u8::is_ascii_uppercase)
            && bytes[2..].iter().all(u8::is_ascii_digit);
        if !valid {
            return Err(InvalidExceptionCode(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }
}

/// Deserializes the exception code of a request as it was typed. A blank
/// string means "no code supplied". The format is left for the policy to
/// check so that a malformed code ends up as an error on its field.
pub fn deserialize_raw_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(code)) => Some(code.trim().to_owned()).filter(|code| !code.is_empty()),
        Some(other) => Some(other.to_string()),
    })
}

/// A specific cause (`causaPuntual`).
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct SpecificCause {
    pub value: String,
    pub label: String,
}

/// A global cause (`causaGlobal`) and the specific causes filed under it.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct CauseGroup {
    #[serde(rename = "causaGlobal")]
    pub global_cause: String,
    #[serde(rename = "causaPuntual")]
    pub specific_causes: Vec<SpecificCause>,
}

/// A catalog entry resolved from a code.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Entry<'a> {
    pub global_cause: &'a str,
    pub label: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read exception code catalog {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed exception code catalog")]
    Json(#[from] serde_json::Error),
    #[error("cause group {group:?} lists an invalid code")]
    InvalidCode {
        group: String,
        #[source]
        source: InvalidExceptionCode,
    },
    #[error("exception code {0} is listed more than once")]
    DuplicateCode(ExceptionCode),
}

const BUILTIN: &str = include_str!("../data/exception-codes.json");

/// Read-only exception code reference data.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    groups: Vec<CauseGroup>,
    /// Code -> (group index, cause index).
    index: HashMap<ExceptionCode, (usize, usize)>,
}

impl Catalog {
    pub fn from_groups(groups: Vec<CauseGroup>) -> Result<Self, CatalogError> {
        let mut index = HashMap::new();
        for (g, group) in groups.iter().enumerate() {
            for (c, cause) in group.specific_causes.iter().enumerate() {
                let code = cause
                    .value
                    .parse::<ExceptionCode>()
                    .map_err(|source| CatalogError::InvalidCode {
                        group: group.global_cause.clone(),
                        source,
                    })?;
                if index.insert(code.clone(), (g, c)).is_some() {
                    return Err(CatalogError::DuplicateCode(code));
                }
            }
        }
        Ok(Self { groups, index })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::from_groups(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            codes = catalog.len(),
            "loaded exception code catalog"
        );
        Ok(catalog)
    }

    /// The reference catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN)
    }

    pub fn contains(&self, code: &ExceptionCode) -> bool {
        self.index.contains_key(code)
    }

    pub fn lookup(&self, code: &ExceptionCode) -> Option<Entry<'_>> {
        let (g, c) = *self.index.get(code)?;
        let group = &self.groups[g];
        Some(Entry {
            global_cause: &group.global_cause,
            label: &group.specific_causes[c].label,
        })
    }

    pub fn groups(&self) -> &[CauseGroup] {
        &self.groups
    }

    /// Number of codes.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
