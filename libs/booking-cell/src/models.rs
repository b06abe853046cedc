// libs/booking-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub customer_id: i64,
    pub provider_id: i64,
    pub date: DateTime<Utc>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_active(&self) -> bool {
        self.canceled_at.is_none()
    }
}

/// User directory entry. Owned by the external account-management service;
/// the booking cell only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_provider: bool,
}

// ==============================================================================
// READ-TIME JOIN VIEWS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarFile {
    pub id: i64,
    pub path: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub id: i64,
    pub name: String,
    pub avatar: Option<AvatarFile>,
}

/// Listing row: appointment enriched with the provider's public profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentView {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub provider: ProviderProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderContact {
    pub name: String,
    pub email: String,
}

/// Cancellation-path row: the full appointment plus the provider's contact
/// details for the cancellation email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub provider: ProviderContact,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Fields of an appointment about to be persisted. `date` keeps the
/// original precision; only availability comparisons truncate it.
#[derive(Debug, Clone, Serialize)]
pub struct NewAppointment {
    pub customer_id: i64,
    pub provider_id: i64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BookAppointmentRequest {
    pub provider_id: i64,
    pub date: DateTime<Utc>,
}

impl BookAppointmentRequest {
    /// Shape validation of an untyped request body. Runs before any lookup
    /// or side effect so a malformed request never touches a collaborator.
    pub fn from_value(body: &Value) -> Result<Self, BookingError> {
        let provider_id = body
            .get("provider_id")
            .and_then(Value::as_i64)
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                BookingError::Validation("provider_id must be a positive integer".to_string())
            })?;

        let date = body
            .get("date")
            .and_then(Value::as_str)
            .ok_or_else(|| BookingError::Validation("date is required".to_string()))?;

        let date = DateTime::parse_from_rfc3339(date)
            .map_err(|_| BookingError::Validation("date must be a valid date-time".to_string()))?
            .with_timezone(&Utc);

        Ok(Self { provider_id, date })
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error("Validation fails: {0}")]
    Validation(String),

    #[error("You can only create appointments with providers")]
    InvalidProvider,

    #[error("You can not create an appointment with yourself")]
    SelfBooking,

    #[error("Past dates are not permitted")]
    PastDate,

    #[error("Appointment date is not available")]
    SlotUnavailable,

    #[error("Appointment not found")]
    NotFound,

    #[error("Only the booking owner can cancel this appointment")]
    NotOwner,

    #[error("You can only cancel appointments 2 hours in advance")]
    CancelWindowExpired,

    #[error("Database error: {0}")]
    Database(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use assert_matches::assert_matches;

    #[test]
    fn parses_well_formed_body() {
        let body = json!({ "provider_id": 3, "date": "2025-06-10T14:30:00Z" });
        let request = BookAppointmentRequest::from_value(&body).unwrap();

        assert_eq!(request.provider_id, 3);
        assert_eq!(request.date.to_rfc3339(), "2025-06-10T14:30:00+00:00");
    }

    #[test]
    fn rejects_missing_provider_id() {
        let body = json!({ "date": "2025-06-10T14:30:00Z" });
        assert_matches!(
            BookAppointmentRequest::from_value(&body),
            Err(BookingError::Validation(_))
        );
    }

    #[test]
    fn rejects_non_positive_provider_id() {
        for id in [0, -1] {
            let body = json!({ "provider_id": id, "date": "2025-06-10T14:30:00Z" });
            assert_matches!(
                BookAppointmentRequest::from_value(&body),
                Err(BookingError::Validation(_))
            );
        }
    }

    #[test]
    fn rejects_fractional_provider_id() {
        let body = json!({ "provider_id": 1.5, "date": "2025-06-10T14:30:00Z" });
        assert_matches!(
            BookAppointmentRequest::from_value(&body),
            Err(BookingError::Validation(_))
        );
    }

    #[test]
    fn rejects_unparseable_date() {
        let body = json!({ "provider_id": 3, "date": "next tuesday" });
        assert_matches!(
            BookAppointmentRequest::from_value(&body),
            Err(BookingError::Validation(_))
        );
    }

    #[test]
    fn preserves_offset_dates_as_utc() {
        let body = json!({ "provider_id": 3, "date": "2025-06-10T14:30:00-03:00" });
        let request = BookAppointmentRequest::from_value(&body).unwrap();
        assert_eq!(request.date.to_rfc3339(), "2025-06-10T17:30:00+00:00");
    }
}
