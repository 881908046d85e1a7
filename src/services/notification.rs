//! Notification record store.
//!
//! The durable, queryable log of in-app notifications. Records are
//! written by the dispatcher regardless of push outcome and only ever
//! mutated by the read/unread toggle.

use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{NotificationCategory, NotificationRecord};

pub struct NotificationService;

impl NotificationService {
    /// Creates one notification record
    pub async fn create(
        pool: &PgPool,
        user_id: i32,
        title: &str,
        message: &str,
        category: NotificationCategory,
    ) -> AppResult<NotificationRecord> {
        let record = sqlx::query_as::<_, NotificationRecord>(
            r#"
            INSERT INTO notifications (user_id, title, message, notification_type)
            VALUES ($1, $2, $3, $4::text::varchar)
            RETURNING id, user_id, title, message, notification_type, is_read, created_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(message)
        .bind(category.to_string())
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Lists a user's notifications, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: i32) -> AppResult<Vec<NotificationRecord>> {
        let records = sqlx::query_as::<_, NotificationRecord>(
            r#"
            SELECT id, user_id, title, message, notification_type, is_read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Counts a user's unread notifications (notification-center badge)
    pub async fn unread_count(pool: &PgPool, user_id: i32) -> AppResult<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count.0)
    }

    /// Marks one notification as read
    pub async fn mark_read(pool: &PgPool, id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Notification {} not found", id)));
        }

        Ok(())
    }

    /// Marks all of a user's notifications as read; returns how many changed
    pub async fn mark_all_read(pool: &PgPool, user_id: i32) -> AppResult<u64> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE")
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected())
    }
}
