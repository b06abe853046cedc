// libs/booking-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_utils::extractor::requester_id;

use crate::models::BookingError;
use crate::services::booking::BookingService;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(params): Query<ListQuery>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let requester = requester_id(&user)?;
    let page = params.page.unwrap_or(1).max(1);

    let service = BookingService::from_config(&state);

    let appointments = service
        .list_appointments(requester, page)
        .await
        .map_err(map_booking_error)?;

    let count = appointments.len();
    Ok(Json(json!({
        "appointments": appointments,
        "page": page,
        "count": count
    })))
}

// The body stays untyped here: shape validation belongs to the booking
// service, so a malformed payload maps to its validation error instead of
// an extractor rejection.
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let requester = requester_id(&user)?;

    let service = BookingService::from_config(&state);

    let appointment = service
        .create_appointment(requester, &body)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let requester = requester_id(&user)?;

    let service = BookingService::from_config(&state);

    let appointment = service
        .cancel_appointment(requester, appointment_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment canceled successfully"
    })))
}

/// Transport mapping of the booking errors. All request-level failures map
/// to 4xx with the domain message; store failures stay generic.
fn map_booking_error(err: BookingError) -> AppError {
    match err {
        BookingError::Validation(_)
        | BookingError::InvalidProvider
        | BookingError::SelfBooking
        | BookingError::PastDate => AppError::BadRequest(err.to_string()),
        BookingError::SlotUnavailable => AppError::Conflict(err.to_string()),
        BookingError::NotFound => AppError::NotFound(err.to_string()),
        BookingError::NotOwner | BookingError::CancelWindowExpired => {
            AppError::Auth(err.to_string())
        }
        BookingError::Database(_) => AppError::Internal("Internal server error".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failures_map_to_4xx() {
        assert!(matches!(
            map_booking_error(BookingError::Validation("bad".into())),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            map_booking_error(BookingError::SlotUnavailable),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            map_booking_error(BookingError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            map_booking_error(BookingError::NotOwner),
            AppError::Auth(_)
        ));
    }

    #[test]
    fn store_failures_stay_generic() {
        let mapped = map_booking_error(BookingError::Database("pg: connection reset".into()));
        match mapped {
            AppError::Internal(msg) => assert!(!msg.contains("pg:")),
            other => panic!("expected internal error, got {:?}", other),
        }
    }
}
