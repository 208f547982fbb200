use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, SecondsFormat};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a goal as understood by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalStatus {
    Active,
    Completed,
    Cancelled,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "ACTIVE",
            GoalStatus::Completed => "COMPLETED",
            GoalStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(GoalStatus::Active),
            "COMPLETED" => Ok(GoalStatus::Completed),
            "CANCELLED" => Ok(GoalStatus::Cancelled),
            other => Err(format!(
                "Unknown goal status '{}'. Valid values: ACTIVE, COMPLETED, CANCELLED",
                other
            )),
        }
    }
}

/// A goal as returned by `/api/goals`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    pub goal_type: String,
    pub target_value: f64,
    #[serde(default)]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Raw form input for a new goal, exactly as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct GoalDraft {
    pub goal_type: String,
    pub target_value: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`, optional
    pub end_date: Option<String>,
}

/// Body of `POST /api/goals`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub goal_type: String,
    pub target_value: f64,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Body of `PUT /api/goals/{id}` when only the status changes.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct GoalStatusUpdate {
    pub status: GoalStatus,
}

impl GoalDraft {
    /// Check the form and convert it into a request body. The error is the
    /// message shown next to the form.
    pub fn validate(&self) -> Result<NewGoal, String> {
        if self.goal_type.trim().is_empty() {
            return Err("Goal type cannot be blank.".to_string());
        }

        let target_value = match self.target_value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => v,
            _ => return Err("Target value must be a positive number.".to_string()),
        };

        if self.start_date.trim().is_empty() {
            return Err("Start date is required.".to_string());
        }
        let start_date = to_utc_timestamp(&self.start_date)?;

        let end_date = match self.end_date.as_deref().map(str::trim) {
            Some(end) if !end.is_empty() => Some(to_utc_timestamp(end)?),
            _ => None,
        };

        Ok(NewGoal {
            goal_type: self.goal_type.clone(),
            target_value,
            start_date,
            end_date,
        })
    }
}

/// `2024-03-01` -> `2024-03-01T00:00:00.000Z`
fn to_utc_timestamp(date: &str) -> Result<String, String> {
    let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a valid date (expected YYYY-MM-DD).", date))?;
    let midnight = parsed
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("'{}' is not a valid date (expected YYYY-MM-DD).", date))?;
    Ok(midnight
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Millis, true))
}
