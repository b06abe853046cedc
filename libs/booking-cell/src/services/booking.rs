// libs/booking-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{
    Appointment, AppointmentView, BookAppointmentRequest, BookingError, NewAppointment, User,
};
use crate::services::availability::AvailabilityService;
use crate::services::schedule::{self, Locale};
use crate::stores::{
    AppointmentStore, HttpMailDispatcher, MailDispatcher, MailMessage, NotificationStore,
    SlotTaken, SupabaseAppointmentStore, SupabaseNotificationStore, SupabaseUserDirectory,
    UserDirectory,
};

pub const PAGE_SIZE: i64 = 20;

const CANCEL_WINDOW_HOURS: i64 = 2;

/// Appointment lifecycle manager: creates, lists and cancels appointments,
/// enforcing the booking rules and orchestrating the availability check and
/// the best-effort side effects. Stateless between requests; all
/// collaborators are injected.
pub struct BookingService {
    users: Arc<dyn UserDirectory>,
    appointments: Arc<dyn AppointmentStore>,
    notifications: Arc<dyn NotificationStore>,
    mailer: Arc<dyn MailDispatcher>,
    availability: AvailabilityService,
    locale: Locale,
}

impl BookingService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        appointments: Arc<dyn AppointmentStore>,
        notifications: Arc<dyn NotificationStore>,
        mailer: Arc<dyn MailDispatcher>,
        locale: Locale,
    ) -> Self {
        let availability = AvailabilityService::new(Arc::clone(&appointments));

        Self {
            users,
            appointments,
            notifications,
            mailer,
            availability,
            locale,
        }
    }

    /// Production wiring: Supabase-backed stores and the HTTP mailer.
    pub fn from_config(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));

        Self::new(
            Arc::new(SupabaseUserDirectory::new(Arc::clone(&supabase))),
            Arc::new(SupabaseAppointmentStore::new(Arc::clone(&supabase))),
            Arc::new(SupabaseNotificationStore::new(supabase)),
            Arc::new(HttpMailDispatcher::new(config)),
            Locale::from_tag(&config.notification_locale),
        )
    }

    /// Active appointments owned by the requester, date ascending, fixed
    /// page size of 20, enriched with the provider profile and avatar.
    pub async fn list_appointments(
        &self,
        requester_id: i64,
        page: u32,
    ) -> Result<Vec<AppointmentView>, BookingError> {
        let page = page.max(1) as i64;
        let offset = (page - 1) * PAGE_SIZE;

        self.appointments
            .find_active_by_owner(requester_id, PAGE_SIZE, offset)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))
    }

    pub async fn create_appointment(
        &self,
        requester_id: i64,
        body: &Value,
    ) -> Result<Appointment, BookingError> {
        // Shape validation first: a malformed request causes no lookup and
        // no side effect.
        let request = BookAppointmentRequest::from_value(body)?;

        let provider = self
            .users
            .find_provider_by_id(request.provider_id)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?
            .ok_or(BookingError::InvalidProvider)?;

        if requester_id == request.provider_id {
            return Err(BookingError::SelfBooking);
        }

        let slot = schedule::hour_start(request.date);

        if schedule::is_before(slot, Utc::now()) {
            return Err(BookingError::PastDate);
        }

        if !self.availability.is_available(request.provider_id, slot).await? {
            return Err(BookingError::SlotUnavailable);
        }

        // Original precision is stored; only the availability key above is
        // hour-truncated.
        let appointment = self
            .appointments
            .create(NewAppointment {
                customer_id: requester_id,
                provider_id: request.provider_id,
                date: request.date,
            })
            .await
            .map_err(|e| {
                if e.is::<SlotTaken>() {
                    BookingError::SlotUnavailable
                } else {
                    BookingError::Database(e.to_string())
                }
            })?;

        info!(
            "Appointment {} booked with provider {} for {}",
            appointment.id, appointment.provider_id, appointment.date
        );

        self.notify_provider(requester_id, &provider, &appointment).await;

        Ok(appointment)
    }

    pub async fn cancel_appointment(
        &self,
        requester_id: i64,
        appointment_id: i64,
    ) -> Result<Appointment, BookingError> {
        let detail = self
            .appointments
            .find_by_id(appointment_id)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?
            .ok_or(BookingError::NotFound)?;

        // Canceled is terminal: a canceled appointment is no longer there
        // to cancel.
        if !detail.appointment.is_active() {
            return Err(BookingError::NotFound);
        }

        // Owner-only: the provider may not cancel a customer's booking.
        if detail.appointment.customer_id != requester_id {
            return Err(BookingError::NotOwner);
        }

        let now = Utc::now();
        let cutoff = schedule::subtract_hours(detail.appointment.date, CANCEL_WINDOW_HOURS);

        // The cutoff itself is already too late.
        if !schedule::is_before(now, cutoff) {
            return Err(BookingError::CancelWindowExpired);
        }

        let canceled = self
            .appointments
            .cancel(appointment_id, now)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        info!("Appointment {} canceled by owner {}", appointment_id, requester_id);

        let message = MailMessage {
            to: format!("{} <{}>", detail.provider.name, detail.provider.email),
            subject: "Appointment canceled".to_string(),
            body: format!(
                "Appointment {} was canceled by the customer.",
                appointment_id
            ),
        };

        if let Err(err) = self.mailer.send(&message).await {
            // Best-effort dispatch: the cancellation already committed.
            warn!(
                "Cancellation email for appointment {} failed: {}",
                appointment_id, err
            );
        }

        Ok(canceled)
    }

    /// Best-effort notification to the provider after a successful booking.
    /// Failures are logged and swallowed; the appointment already committed.
    async fn notify_provider(&self, requester_id: i64, provider: &User, appointment: &Appointment) {
        let customer_name = match self.users.find_by_id(requester_id).await {
            Ok(Some(customer)) => customer.name,
            Ok(None) => {
                warn!(
                    "Booking notification skipped: requester {} not found in directory",
                    requester_id
                );
                return;
            }
            Err(err) => {
                warn!("Booking notification skipped: {}", err);
                return;
            }
        };

        let formatted = schedule::format_human(schedule::hour_start(appointment.date), self.locale);
        let content = self.locale.new_booking_message(&customer_name, &formatted);

        match self.notifications.create(&content, provider.id).await {
            Ok(()) => debug!("Notified provider {} of appointment {}", provider.id, appointment.id),
            Err(err) => warn!(
                "Booking notification for provider {} failed: {}",
                provider.id, err
            ),
        }
    }
}
