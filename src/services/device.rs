//! Device registry service.
//!
//! Owns the `device_registrations` table: upsert-by-(user, provider,
//! handle) registration, valid-handle lookup for dispatch, and the soft
//! `invalid` flag set when a provider reports a handle as dead.

use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::{DeviceRegistration, RegisterDevice};
use crate::services::push;

pub struct DeviceRegistryService;

impl DeviceRegistryService {
    /// Registers a device endpoint, or refreshes it if already known.
    ///
    /// Re-registration bumps `last_seen_at` and clears the invalid flag;
    /// a device that just re-registered is assumed healthy again.
    pub async fn register(pool: &PgPool, input: RegisterDevice) -> AppResult<DeviceRegistration> {
        push::validate_handle(input.provider, &input.handle)?;

        let registration = sqlx::query_as::<_, DeviceRegistration>(
            r#"
            INSERT INTO device_registrations (user_id, provider, handle, device_type)
            VALUES ($1, $2::text::varchar, $3, $4::text::varchar)
            ON CONFLICT (user_id, provider, handle)
            DO UPDATE SET last_seen_at = NOW(),
                          invalid = FALSE,
                          device_type = EXCLUDED.device_type
            RETURNING id, user_id, provider, handle, device_type, invalid,
                      created_at, last_seen_at
            "#,
        )
        .bind(input.user_id)
        .bind(input.provider.to_string())
        .bind(&input.handle)
        .bind(input.device_type.to_string())
        .fetch_one(pool)
        .await?;

        log::debug!(
            "Registered {} handle for user {} (registration {})",
            registration.provider,
            registration.user_id,
            registration.id
        );

        Ok(registration)
    }

    /// Lists a user's dispatchable handles, newest activity first.
    /// Invalid registrations are excluded from fan-out.
    pub async fn list_valid(pool: &PgPool, user_id: i32) -> AppResult<Vec<DeviceRegistration>> {
        let registrations = sqlx::query_as::<_, DeviceRegistration>(
            r#"
            SELECT id, user_id, provider, handle, device_type, invalid,
                   created_at, last_seen_at
            FROM device_registrations
            WHERE user_id = $1 AND invalid = FALSE
            ORDER BY last_seen_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(registrations)
    }

    /// Lists every registration for a user, including invalidated ones
    pub async fn list_all(pool: &PgPool, user_id: i32) -> AppResult<Vec<DeviceRegistration>> {
        let registrations = sqlx::query_as::<_, DeviceRegistration>(
            r#"
            SELECT id, user_id, provider, handle, device_type, invalid,
                   created_at, last_seen_at
            FROM device_registrations
            WHERE user_id = $1
            ORDER BY last_seen_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(registrations)
    }

    /// Marks a registration as invalid after a permanent provider
    /// rejection. Idempotent; the row is never deleted.
    pub async fn mark_invalid(pool: &PgPool, registration_id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE device_registrations SET invalid = TRUE WHERE id = $1")
            .bind(registration_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            log::debug!(
                "mark_invalid: registration {} no longer exists",
                registration_id
            );
        }

        Ok(())
    }
}
