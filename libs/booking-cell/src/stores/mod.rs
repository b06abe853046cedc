// libs/booking-cell/src/stores/mod.rs
//
// Collaborator ports. The booking service is constructed against these
// traits so tests can substitute in-memory fakes; production wiring uses
// the Supabase/HTTP adapters below.
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Appointment, AppointmentDetail, AppointmentView, NewAppointment, User};

pub mod mailer;
pub mod supabase;

pub use mailer::HttpMailDispatcher;
pub use supabase::{SupabaseAppointmentStore, SupabaseNotificationStore, SupabaseUserDirectory};

/// Marker error for an insert rejected by the storage uniqueness constraint
/// on active `(provider_id, hour_start)`. The booking service reinterprets
/// it as a slot-unavailable failure.
#[derive(Debug, thiserror::Error)]
#[error("an active appointment already occupies this slot")]
pub struct SlotTaken;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Resolves the user only when flagged as a provider.
    async fn find_provider_by_id(&self, id: i64) -> Result<Option<User>>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Active appointments owned by `owner_id`, `date` ascending, with the
    /// provider profile and avatar joined at read time.
    async fn find_active_by_owner(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AppointmentView>>;

    /// The active appointment occupying `(provider_id, slot)`, if any.
    /// `slot` is an hour-start timestamp.
    async fn find_active_slot(
        &self,
        provider_id: i64,
        slot: DateTime<Utc>,
    ) -> Result<Option<Appointment>>;

    /// Persists a new appointment. Fails with a `SlotTaken` source when the
    /// storage layer enforces slot uniqueness and rejects the write.
    async fn create(&self, fields: NewAppointment) -> Result<Appointment>;

    /// Appointment by id with the provider's name and email joined in.
    async fn find_by_id(&self, id: i64) -> Result<Option<AppointmentDetail>>;

    /// Sets `canceled_at` and persists the mutation.
    async fn cancel(&self, id: i64, at: DateTime<Utc>) -> Result<Appointment>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, content: &str, recipient_user_id: i64) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait MailDispatcher: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<()>;
}
