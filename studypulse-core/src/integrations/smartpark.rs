//! SmartPark parking integration (demo stub).
//!
//! Mirrors the SmartPark reservation API surface: lot listing, per-student
//! reservation lookup, and reservation create/cancel. Every call answers
//! from canned data.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A parking lot as reported by SmartPark.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLot {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub total_spaces: u32,
    pub available_spaces: u32,
    pub hourly_rate: f64,
    pub is_open: bool,
}

/// Reservation lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Active,
    Completed,
    Cancelled,
}

/// A parking reservation held by a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingReservation {
    pub id: String,
    pub student_id: String,
    pub lot_id: String,
    pub lot_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_number: Option<String>,
    pub cost: f64,
}

/// SmartPark API client (canned responses).
pub struct SmartParkClient {
    #[allow(dead_code)] // Carried for parity with the real client's auth
    api_key: String,
}

impl SmartParkClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// List lots with open spaces.
    pub fn available_lots(&self) -> Vec<ParkingLot> {
        canned_lots()
    }

    /// Reservations held by the given student.
    pub fn reservations(&self, student_id: &str) -> Vec<ParkingReservation> {
        canned_reservations()
            .into_iter()
            .filter(|r| r.student_id == student_id)
            .collect()
    }

    /// Create a reservation. Always succeeds with a fabricated confirmation.
    pub fn create_reservation(
        &self,
        student_id: &str,
        lot_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> ParkingReservation {
        let lot_name = canned_lots()
            .into_iter()
            .find(|lot| lot.id == lot_id)
            .map(|lot| lot.name)
            .unwrap_or_default();

        ParkingReservation {
            id: format!("res_{}", Utc::now().timestamp_millis()),
            student_id: student_id.to_string(),
            lot_id: lot_id.to_string(),
            lot_name,
            start_time,
            end_time,
            status: ReservationStatus::Active,
            space_number: Some("B12".to_string()),
            cost: 40.0,
        }
    }

    /// Cancel a reservation. Always reports success.
    pub fn cancel_reservation(&self, _reservation_id: &str) -> bool {
        true
    }

    /// Whether the API is reachable. Always true for the stub.
    pub fn api_status(&self) -> bool {
        true
    }
}

fn canned_lots() -> Vec<ParkingLot> {
    vec![
        ParkingLot {
            id: "1".to_string(),
            name: "University Main Lot".to_string(),
            address: "123 Campus Drive".to_string(),
            latitude: 42.3601,
            longitude: -71.0589,
            total_spaces: 200,
            available_spaces: 45,
            hourly_rate: 5.0,
            is_open: true,
        },
        ParkingLot {
            id: "2".to_string(),
            name: "Library Parking Garage".to_string(),
            address: "456 Study Street".to_string(),
            latitude: 42.3602,
            longitude: -71.059,
            total_spaces: 150,
            available_spaces: 30,
            hourly_rate: 4.0,
            is_open: true,
        },
    ]
}

fn canned_reservations() -> Vec<ParkingReservation> {
    let start = Utc::now() - Duration::hours(2);
    vec![ParkingReservation {
        id: "res_1".to_string(),
        student_id: "child1".to_string(),
        lot_id: "1".to_string(),
        lot_name: "University Main Lot".to_string(),
        start_time: start,
        end_time: start + Duration::hours(8),
        status: ReservationStatus::Active,
        space_number: Some("A45".to_string()),
        cost: 40.0,
    }]
}
