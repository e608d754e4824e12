use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::game::FinalSummary;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 20;

/// Stored leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub player_name: String,
    pub score: u32,
    pub startups: u32,
    pub unicorns: u32,
    pub created_at: DateTime<Utc>,
}

/// Submission payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeaderboardEntry {
    pub player_name: String,
    pub score: u32,
    pub startups: u32,
    #[serde(default)]
    pub unicorns: u32,
}

impl NewLeaderboardEntry {
    pub fn from_summary(player_name: impl Into<String>, summary: &FinalSummary) -> Self {
        Self {
            player_name: player_name.into(),
            score: summary.score,
            startups: summary.startups() as u32,
            unicorns: summary.unicorns() as u32,
        }
    }

    /// Check a raw JSON body field by field so the caller gets a readable reason
    pub fn validate(body: &Value) -> Result<Self, ValidationError> {
        let object = body.as_object().ok_or(ValidationError::NotAnObject)?;

        let player_name = match object.get("playerName") {
            None | Some(Value::Null) => return Err(ValidationError::Missing("playerName")),
            Some(Value::String(name)) => name.clone(),
            Some(_) => {
                return Err(ValidationError::InvalidType {
                    field: "playerName",
                    expected: "a string",
                });
            }
        };

        Ok(Self {
            player_name,
            score: count_field(object, "score")?.ok_or(ValidationError::Missing("score"))?,
            startups: count_field(object, "startups")?
                .ok_or(ValidationError::Missing("startups"))?,
            unicorns: count_field(object, "unicorns")?.unwrap_or(0),
        })
    }

    pub fn into_entry(self, now: DateTime<Utc>) -> LeaderboardEntry {
        LeaderboardEntry {
            id: Uuid::new_v4(),
            player_name: self.player_name,
            score: self.score,
            startups: self.startups,
            unicorns: self.unicorns,
            created_at: now,
        }
    }
}

fn count_field(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<Option<u32>, ValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or(ValidationError::InvalidType {
                field,
                expected: "a non-negative integer",
            }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("invalid JSON: {0}")]
    Malformed(String),
    #[error("missing required field `{0}`")]
    Missing(&'static str),
    #[error("field `{field}` must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },
}

/// `?limit=` handling: default 20, clamped to 1..=20
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_payload() {
        let entry = NewLeaderboardEntry::validate(&json!({
            "playerName": "ada",
            "score": 145,
            "startups": 9,
            "unicorns": 1
        }))
        .unwrap();

        assert_eq!(entry.player_name, "ada");
        assert_eq!(entry.score, 145);
        assert_eq!(entry.startups, 9);
        assert_eq!(entry.unicorns, 1);
    }

    #[test]
    fn test_unicorns_default_to_zero() {
        let entry = NewLeaderboardEntry::validate(&json!({
            "playerName": "ada",
            "score": 10,
            "startups": 1
        }))
        .unwrap();
        assert_eq!(entry.unicorns, 0);
    }

    #[test]
    fn test_missing_field() {
        let err = NewLeaderboardEntry::validate(&json!({"playerName": "ada", "score": 10}))
            .unwrap_err();
        assert_eq!(err, ValidationError::Missing("startups"));
        assert_eq!(err.to_string(), "missing required field `startups`");
    }

    #[test]
    fn test_wrong_types() {
        let err = NewLeaderboardEntry::validate(&json!({
            "playerName": 7,
            "score": 10,
            "startups": 1
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidType { field: "playerName", .. }));

        let err = NewLeaderboardEntry::validate(&json!({
            "playerName": "ada",
            "score": -5,
            "startups": 1
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidType { field: "score", .. }));

        let err = NewLeaderboardEntry::validate(&json!({
            "playerName": "ada",
            "score": 10.5,
            "startups": 1
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidType { field: "score", .. }));
    }

    #[test]
    fn test_not_an_object() {
        let err = NewLeaderboardEntry::validate(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err, ValidationError::NotAnObject);
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = NewLeaderboardEntry {
            player_name: "ada".to_string(),
            score: 5,
            startups: 1,
            unicorns: 0,
        }
        .into_entry(Utc::now());
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["playerName"], "ada");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("id").is_some());
    }

    #[test]
    fn test_from_summary_counts_unicorns() {
        use crate::game::{AcquiredRecord, CollisionType, Tier};

        let record = |tier: Tier| AcquiredRecord {
            name: "Stripe".to_string(),
            sector: "Fintech".to_string(),
            tier,
            value: tier.value(),
        };
        let summary = FinalSummary {
            score: 65,
            level: 1,
            portfolio: vec![record(Tier::Unicorn), record(Tier::SeriesA), record(Tier::Seed)],
            collision: CollisionType::Wall,
            previous_best: 0,
            new_record: true,
        };

        let entry = NewLeaderboardEntry::from_summary("ada", &summary);
        assert_eq!(entry.score, 65);
        assert_eq!(entry.startups, 3);
        assert_eq!(entry.unicorns, 1);
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 20);
        assert_eq!(clamp_limit(Some(5)), 5);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(500)), 20);
    }
}
