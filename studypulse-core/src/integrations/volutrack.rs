//! VoluTrack volunteering integration (demo stub).
//!
//! Mirrors the VoluTrack API surface: per-student volunteering metrics and
//! the open-postings board. Every call answers from canned data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Review state of a logged volunteer activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Completed,
    Pending,
    Verified,
}

/// A volunteer activity a student has logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerActivity {
    pub id: String,
    pub title: String,
    pub date: String,
    pub hours: u32,
    pub organization: String,
    pub category: String,
    pub status: ActivityStatus,
}

/// Aggregate volunteering figures for one student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerMetrics {
    pub total_hours: u32,
    pub activities_completed: u32,
    pub category_summary: BTreeMap<String, u32>,
    pub recent_activities: Vec<VolunteerActivity>,
}

/// An open volunteering opportunity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerPosting {
    pub id: String,
    pub title: String,
    pub organization: String,
    pub description: String,
    pub date: String,
    pub duration: u32,
    pub location: String,
    pub category: String,
    pub spots_available: u32,
}

/// VoluTrack API client (canned responses).
pub struct VoluTrackClient {
    #[allow(dead_code)] // Carried for parity with the real client's auth
    auth_token: String,
}

impl VoluTrackClient {
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
        }
    }

    /// Volunteering metrics for the given student.
    ///
    /// The stub reports the same figures for every student id.
    pub fn student_metrics(&self, _student_id: &str) -> VolunteerMetrics {
        let mut category_summary = BTreeMap::new();
        category_summary.insert("Environmental".to_string(), 20);
        category_summary.insert("Education".to_string(), 30);
        category_summary.insert("Community Service".to_string(), 25);

        VolunteerMetrics {
            total_hours: 75,
            activities_completed: 12,
            category_summary,
            recent_activities: vec![
                VolunteerActivity {
                    id: "1".to_string(),
                    title: "Beach Cleanup".to_string(),
                    date: "2024-03-15".to_string(),
                    hours: 4,
                    organization: "Ocean Guardians".to_string(),
                    category: "Environmental".to_string(),
                    status: ActivityStatus::Verified,
                },
                VolunteerActivity {
                    id: "2".to_string(),
                    title: "Math Tutoring".to_string(),
                    date: "2024-03-10".to_string(),
                    hours: 2,
                    organization: "Local High School".to_string(),
                    category: "Education".to_string(),
                    status: ActivityStatus::Verified,
                },
            ],
        }
    }

    /// Open postings, optionally narrowed to a category.
    pub fn postings(&self, category: Option<&str>) -> Vec<VolunteerPosting> {
        let postings = canned_postings();
        match category {
            Some(category) => postings
                .into_iter()
                .filter(|p| p.category == category)
                .collect(),
            None => postings,
        }
    }
}

fn canned_postings() -> Vec<VolunteerPosting> {
    vec![
        VolunteerPosting {
            id: "1".to_string(),
            title: "Library Reading Program".to_string(),
            organization: "City Library".to_string(),
            description: "Help young children improve their reading skills".to_string(),
            date: "2024-04-15".to_string(),
            duration: 2,
            location: "Main Library".to_string(),
            category: "Education".to_string(),
            spots_available: 5,
        },
        VolunteerPosting {
            id: "2".to_string(),
            title: "Food Bank Distribution".to_string(),
            organization: "Community Food Bank".to_string(),
            description: "Help sort and distribute food to those in need".to_string(),
            date: "2024-04-20".to_string(),
            duration: 3,
            location: "Food Bank Warehouse".to_string(),
            category: "Community Service".to_string(),
            spots_available: 10,
        },
    ]
}
