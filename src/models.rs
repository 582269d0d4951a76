use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a job application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Interview,
    Offer,
    Rejected,
    // Anything the server sends that isn't one of the four known values.
    // Renders blank rather than failing.
    #[serde(other)]
    Unknown,
}

impl Default for Status {
    fn default() -> Self {
        Status::Pending
    }
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Pending,
        Status::Interview,
        Status::Offer,
        Status::Rejected,
    ];

    /// Raw wire value, as stored and exported.
    pub fn value(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Interview => "interview",
            Status::Offer => "offer",
            Status::Rejected => "rejected",
            Status::Unknown => "",
        }
    }

    /// Human-readable label for tables and the TUI.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Interview => "Interview",
            Status::Offer => "Offer",
            Status::Rejected => "Rejected",
            Status::Unknown => "",
        }
    }

    pub fn parse(s: &str) -> Option<Status> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Status::Pending),
            "interview" => Some(Status::Interview),
            "offer" => Some(Status::Offer),
            "rejected" => Some(Status::Rejected),
            _ => None,
        }
    }
}

pub fn resolve_status(name: &str) -> Result<Status> {
    Status::parse(name).ok_or_else(|| {
        anyhow!(
            "Unknown status '{}'. Available: pending, interview, offer, rejected",
            name
        )
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    // Assigned by the record store on creation; absent on an unsaved draft.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: Status,
    // Kept as the wire string; the store may send a full timestamp.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub notes: String,
}

impl ApplicationRecord {
    /// Calendar-date portion of `date`, with any time-of-day stripped.
    pub fn date_only(&self) -> &str {
        match self.date.split_once('T') {
            Some((day, _)) => day,
            None => self.date.as_str(),
        }
    }

    /// Parsed calendar date for sorting; unparseable dates sort first.
    pub fn date_value(&self) -> NaiveDate {
        NaiveDate::parse_from_str(self.date_only(), "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
    }

    /// Numeric value of the free-text salary: keep the digits, drop the
    /// punctuation. "$80,000" -> 80000; empty or non-numeric -> 0.
    pub fn salary_value(&self) -> i64 {
        let digits: String = self.salary.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.parse().unwrap_or(0)
    }
}

pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, salary: &str) -> ApplicationRecord {
        ApplicationRecord {
            id: None,
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            location: String::new(),
            status: Status::Pending,
            date: date.to_string(),
            salary: salary.to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_status_parse_and_value() {
        assert_eq!(Status::parse("pending"), Some(Status::Pending));
        assert_eq!(Status::parse("OFFER"), Some(Status::Offer));
        assert_eq!(Status::parse("ghosted"), None);
        assert_eq!(Status::Interview.value(), "interview");
        assert_eq!(Status::Rejected.label(), "Rejected");
    }

    #[test]
    fn test_unknown_status_renders_blank() {
        let json = r#"{"company":"Acme","position":"Engineer","status":"archived"}"#;
        let rec: ApplicationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.status, Status::Unknown);
        assert_eq!(rec.status.label(), "");
        assert_eq!(rec.status.value(), "");
    }

    #[test]
    fn test_date_only_strips_time_component() {
        assert_eq!(record("2024-03-05T00:00:00.000Z", "").date_only(), "2024-03-05");
        assert_eq!(record("2024-03-05", "").date_only(), "2024-03-05");
    }

    #[test]
    fn test_date_value_tolerates_garbage() {
        assert_eq!(
            record("2024-03-05", "").date_value(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert_eq!(record("soon", "").date_value(), NaiveDate::MIN);
        assert_eq!(record("", "").date_value(), NaiveDate::MIN);
    }

    #[test]
    fn test_salary_value_extracts_digits() {
        assert_eq!(record("", "$80,000").salary_value(), 80000);
        assert_eq!(record("", "120000").salary_value(), 120000);
        assert_eq!(record("", "").salary_value(), 0);
        assert_eq!(record("", "abc").salary_value(), 0);
    }

    #[test]
    fn test_wire_id_is_underscore_id() {
        let json = r#"{"_id":"abc123","company":"Acme","position":"Engineer"}"#;
        let rec: ApplicationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.id.as_deref(), Some("abc123"));

        let draft = record("2024-01-01", "");
        let out = serde_json::to_string(&draft).unwrap();
        assert!(!out.contains("_id"));
    }
}
