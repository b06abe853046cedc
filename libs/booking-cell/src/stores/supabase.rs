// libs/booking-cell/src/stores/supabase.rs
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_database::{SupabaseClient, SupabaseError};

use crate::models::{Appointment, AppointmentDetail, AppointmentView, NewAppointment, User};
use crate::stores::{AppointmentStore, NotificationStore, SlotTaken, UserDirectory};

fn representation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

// ==============================================================================
// USER DIRECTORY
// ==============================================================================

pub struct SupabaseUserDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseUserDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn find_one(&self, path: &str) -> Result<Option<User>> {
        let result: Vec<User> = self
            .supabase
            .request(Method::GET, path, None, None)
            .await?;

        Ok(result.into_iter().next())
    }
}

#[async_trait]
impl UserDirectory for SupabaseUserDirectory {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let path = format!("/rest/v1/users?id=eq.{}&limit=1", id);
        self.find_one(&path).await
    }

    async fn find_provider_by_id(&self, id: i64) -> Result<Option<User>> {
        let path = format!("/rest/v1/users?id=eq.{}&is_provider=eq.true&limit=1", id);
        self.find_one(&path).await
    }
}

// ==============================================================================
// APPOINTMENT STORE
// ==============================================================================

pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn find_active_by_owner(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AppointmentView>> {
        // Read-time join: provider profile and avatar come back embedded,
        // there is no stored denormalization.
        let path = format!(
            "/rest/v1/appointments?select=id,date,provider:users!provider_id(id,name,avatar:files!avatar_id(id,path,url))&customer_id=eq.{}&canceled_at=is.null&order=date.asc&limit={}&offset={}",
            owner_id, limit, offset
        );

        let appointments: Vec<AppointmentView> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await?;

        debug!("Loaded {} appointments for owner {}", appointments.len(), owner_id);
        Ok(appointments)
    }

    async fn find_active_slot(
        &self,
        provider_id: i64,
        slot: DateTime<Utc>,
    ) -> Result<Option<Appointment>> {
        // Rows keep their original precision, so occupancy is a half-open
        // range scan over the containing hour, not an equality match.
        let slot_end = slot + Duration::hours(1);
        let path = format!(
            "/rest/v1/appointments?provider_id=eq.{}&canceled_at=is.null&date=gte.{}&date=lt.{}&limit=1",
            provider_id,
            urlencoding::encode(&slot.to_rfc3339()),
            urlencoding::encode(&slot_end.to_rfc3339())
        );

        let result: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await?;

        Ok(result.into_iter().next())
    }

    async fn create(&self, fields: NewAppointment) -> Result<Appointment> {
        let body = json!({
            "customer_id": fields.customer_id,
            "provider_id": fields.provider_id,
            "date": fields.date.to_rfc3339(),
        });

        let result: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                None,
                Some(body),
                Some(representation_headers()),
            )
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    anyhow::Error::new(SlotTaken)
                } else {
                    anyhow::Error::new(e)
                }
            })?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("insert returned no representation"))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AppointmentDetail>> {
        let path = format!(
            "/rest/v1/appointments?select=*,provider:users!provider_id(name,email)&id=eq.{}&limit=1",
            id
        );

        let result: Vec<AppointmentDetail> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await?;

        Ok(result.into_iter().next())
    }

    async fn cancel(&self, id: i64, at: DateTime<Utc>) -> Result<Appointment> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let body = json!({
            "canceled_at": at.to_rfc3339(),
            "updated_at": at.to_rfc3339(),
        });

        let result: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                None,
                Some(body),
                Some(representation_headers()),
            )
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("update returned no representation"))
    }
}

// ==============================================================================
// NOTIFICATION STORE
// ==============================================================================

pub struct SupabaseNotificationStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseNotificationStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl NotificationStore for SupabaseNotificationStore {
    async fn create(&self, content: &str, recipient_user_id: i64) -> Result<()> {
        let body = json!({
            "content": content,
            "recipient_user_id": recipient_user_id,
            "read": false,
        });

        let _: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/notifications",
                None,
                Some(body),
                Some(representation_headers()),
            )
            .await?;

        Ok(())
    }
}
