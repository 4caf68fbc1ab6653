use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Interviewing,
    Offered,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Offered => "offered",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }
}

/// Body of create and update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApplication {
    pub company_name: String,
    pub position: String,
    pub application_date: NaiveDate,
    pub status: ApplicationStatus,
    pub notes: String,
}

/// A tracked application as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub company_name: String,
    pub position: String,
    pub application_date: NaiveDate,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationList {
    #[serde(default)]
    pub applications: Vec<Application>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_application_deserializes_backend_row() {
        let app: Application = serde_json::from_value(json!({
            "id": "a1",
            "company_name": "Acme",
            "position": "Engineer",
            "application_date": "2025-02-14",
            "status": "interviewing",
            "notes": "Onsite next week",
            "created_at": "2025-02-14T09:30:00Z"
        }))
        .unwrap();
        assert_eq!(app.status, ApplicationStatus::Interviewing);
        assert_eq!(
            app.application_date,
            NaiveDate::from_ymd_opt(2025, 2, 14).unwrap()
        );
        assert!(app.created_at.is_some());
    }

    #[test]
    fn test_missing_list_defaults_to_empty() {
        let list: ApplicationList = serde_json::from_value(json!({})).unwrap();
        assert!(list.applications.is_empty());
    }

    #[test]
    fn test_status_strings_match_serde() {
        for status in [
            ApplicationStatus::Applied,
            ApplicationStatus::Interviewing,
            ApplicationStatus::Offered,
            ApplicationStatus::Rejected,
            ApplicationStatus::Withdrawn,
        ] {
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
    }
}
