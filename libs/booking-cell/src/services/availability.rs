// libs/booking-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::BookingError;
use crate::stores::AppointmentStore;

/// Answers whether `(provider, hour-start)` is free. Read-only; the check
/// and the subsequent create are not atomic against concurrent callers, the
/// storage constraint closes that window.
pub struct AvailabilityService {
    appointments: Arc<dyn AppointmentStore>,
}

impl AvailabilityService {
    pub fn new(appointments: Arc<dyn AppointmentStore>) -> Self {
        Self { appointments }
    }

    /// True iff no active appointment occupies `(provider_id, slot)`.
    /// `slot` must already be hour-truncated.
    pub async fn is_available(
        &self,
        provider_id: i64,
        slot: DateTime<Utc>,
    ) -> Result<bool, BookingError> {
        let occupied = self
            .appointments
            .find_active_slot(provider_id, slot)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        debug!(
            "Slot {} for provider {} is {}",
            slot,
            provider_id,
            if occupied.is_none() { "free" } else { "taken" }
        );

        Ok(occupied.is_none())
    }
}
