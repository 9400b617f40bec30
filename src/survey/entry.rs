//! Survey record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SurveyError};

/// Size bands offered by the submission form
pub const ORG_SIZES: &[&str] = &["1-10", "11-50", "51-200", "201-1000", "1000+"];

/// Industries offered by the submission form
pub const INDUSTRIES: &[&str] = &[
    "Technology",
    "Finance",
    "Healthcare",
    "Retail",
    "Manufacturing",
    "Other",
];

/// OpenTelemetry adoption answers
pub const OTEL_ADOPTION: &[&str] = &["yes", "no", "planning"];

/// A stored survey, including the server-assigned identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: u64,
    pub org_name: String,
    pub org_size: String,
    pub industry: String,
    pub has_otel: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Survey {
    /// Raw value of a categorical field
    pub fn value_of(&self, field: SurveyField) -> &str {
        match field {
            SurveyField::OrgSize => &self.org_size,
            SurveyField::Industry => &self.industry,
            SurveyField::HasOtel => &self.has_otel,
        }
    }
}

/// A validated submission, ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewSurvey {
    pub org_name: String,
    pub org_size: String,
    pub industry: String,
    pub has_otel: String,
    pub email: String,
}

impl NewSurvey {
    pub(crate) fn into_survey(self, id: u64, created_at: DateTime<Utc>) -> Survey {
        Survey {
            id,
            org_name: self.org_name,
            org_size: self.org_size,
            industry: self.industry,
            has_otel: self.has_otel,
            email: self.email,
            created_at,
        }
    }
}

/// Inbound submission as the client sent it.
///
/// Every field is optional here; presence is checked by the service so that
/// all missing fields can be reported at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySubmission {
    #[serde(default, deserialize_with = "lenient_string")]
    pub org_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub org_size: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub has_otel: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
}

impl SurveySubmission {
    /// Parse a request body. Anything but a JSON object is malformed.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| SurveyError::malformed(format!("body is not valid JSON: {}", e)))?;

        if !value.is_object() {
            return Err(SurveyError::malformed("body must be a JSON object"));
        }

        serde_json::from_value(value).map_err(|e| SurveyError::malformed(e.to_string()))
    }

    /// Field values paired with their wire names, in declaration order
    pub(crate) fn fields(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("orgName", self.org_name.as_deref()),
            ("orgSize", self.org_size.as_deref()),
            ("industry", self.industry.as_deref()),
            ("hasOtel", self.has_otel.as_deref()),
            ("email", self.email.as_deref()),
        ]
    }
}

// Non-string values count as absent; the service then names the field.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Categorical fields that can be broken down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurveyField {
    OrgSize,
    Industry,
    HasOtel,
}

impl SurveyField {
    pub const ALL: [SurveyField; 3] = [Self::OrgSize, Self::Industry, Self::HasOtel];

    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrgSize => "orgSize",
            Self::Industry => "industry",
            Self::HasOtel => "hasOtel",
        }
    }

    /// Values the form offers. Not enforced on submit.
    pub fn known_values(&self) -> &'static [&'static str] {
        match self {
            Self::OrgSize => ORG_SIZES,
            Self::Industry => INDUSTRIES,
            Self::HasOtel => OTEL_ADOPTION,
        }
    }

    pub fn is_known(&self, value: &str) -> bool {
        self.known_values().contains(&value)
    }
}
