//! Strongly-typed identifiers used across the record collections.
//!
//! All identifiers are opaque text issued by upstream systems. None of them is
//! assumed unique except `IssueId`.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// Local Purchase Order number linking deliveries to issuances.
///
/// Not unique on either side: one order spans many delivery lines and many
/// issuance events.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LpoNumber(String);

/// Stock keeping code of an item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCode(String);

/// Identifier of a single dispensing event (unique within the issuance stream).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(String);

macro_rules! impl_code_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap raw identifier text without validation.
            ///
            /// Prefer `str::parse` for untrusted input.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = AnalyticsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(AnalyticsError::invalid_id(format!("{}: blank", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

impl_code_newtype!(LpoNumber, "LpoNumber");
impl_code_newtype!(ItemCode, "ItemCode");
impl_code_newtype!(IssueId, "IssueId");
