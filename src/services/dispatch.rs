//! Dispatch orchestrator.
//!
//! Takes a notification intent through validate, fetch handles, fan out,
//! record. The fan-out is concurrent and never short-circuits: one
//! provider's failure or latency cannot block the others. The in-app
//! record is written unconditionally afterwards (push delivery is
//! advisory, the record is the source of truth), so the notification
//! center never shows gaps caused by a provider outage.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{
    DispatchOutcome, NotificationIntent, ProviderDelivery, PushProviderKind,
};
use crate::services::push::{self, PushAdapter, PushCredentials, SendOutcome};
use crate::services::{DeviceRegistryService, NotificationService};

/// Orchestrates dispatch calls over an injected set of provider adapters.
///
/// Adapters are constructed once at startup; tests substitute fakes.
pub struct Dispatcher {
    adapters: HashMap<PushProviderKind, Arc<dyn PushAdapter>>,
    send_timeout: std::time::Duration,
}

impl Dispatcher {
    pub fn new(adapters: Vec<Arc<dyn PushAdapter>>) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.provider(), adapter))
            .collect();

        Self {
            adapters,
            send_timeout: push::SEND_TIMEOUT,
        }
    }

    /// Overrides the per-send timeout (tests drive this with fakes)
    pub fn with_send_timeout(mut self, send_timeout: std::time::Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Builds the production adapter set from resolved credentials
    pub fn from_credentials(credentials: &PushCredentials) -> Self {
        Self::new(push::build_adapters(credentials))
    }

    /// Whether a provider has a usable adapter
    pub fn is_configured(&self, provider: PushProviderKind) -> bool {
        self.adapters.contains_key(&provider)
    }

    /// Dispatches one notification: concurrent best-effort push to every
    /// valid handle, then exactly one durable record.
    ///
    /// Push failures are folded into the outcome map. Only a validation
    /// failure (before any side effect) or a record-store failure aborts
    /// the call.
    pub async fn dispatch(
        &self,
        pool: &PgPool,
        intent: NotificationIntent,
    ) -> AppResult<DispatchOutcome> {
        intent.validate()?;

        // Run on a detached task so caller cancellation cannot skip the
        // record write once sending has started.
        let pool = pool.clone();
        let adapters = self.adapters.clone();
        tokio::spawn(Self::run(pool, adapters, self.send_timeout, intent))
            .await
            .map_err(|e| AppError::Internal(format!("Dispatch task failed: {}", e)))?
    }

    async fn run(
        pool: PgPool,
        adapters: HashMap<PushProviderKind, Arc<dyn PushAdapter>>,
        send_timeout: std::time::Duration,
        intent: NotificationIntent,
    ) -> AppResult<DispatchOutcome> {
        let registrations = DeviceRegistryService::list_valid(&pool, intent.user_id).await?;

        // Fan out to every (handle, adapter) pair at once and wait for all
        // of them to settle.
        let sends = registrations.iter().map(|registration| {
            let adapter = adapters.get(&registration.provider).cloned();
            let intent = &intent;
            async move {
                let delivery = match adapter {
                    None => {
                        log::debug!(
                            "Provider {} unconfigured, skipping registration {}",
                            registration.provider,
                            registration.id
                        );
                        ProviderDelivery::SkippedUnconfigured
                    }
                    Some(adapter) => {
                        match tokio::time::timeout(
                            send_timeout,
                            adapter.send(&registration.handle, intent),
                        )
                        .await
                        {
                            Ok(SendOutcome::Sent) => ProviderDelivery::Sent,
                            Ok(SendOutcome::Permanent(reason)) => {
                                log::warn!(
                                    "Permanent {} failure for registration {}: {}",
                                    registration.provider,
                                    registration.id,
                                    reason
                                );
                                ProviderDelivery::FailedPermanent
                            }
                            Ok(SendOutcome::Transient(reason)) => {
                                log::warn!(
                                    "Transient {} failure for registration {}: {}",
                                    registration.provider,
                                    registration.id,
                                    reason
                                );
                                ProviderDelivery::FailedTransient
                            }
                            Err(_) => {
                                log::warn!(
                                    "{} send timed out for registration {}",
                                    registration.provider,
                                    registration.id
                                );
                                ProviderDelivery::FailedTransient
                            }
                        }
                    }
                };

                (registration, delivery)
            }
        });
        let results = join_all(sends).await;

        // Dead handles drop out of future fan-outs. Failures here are
        // logged, not propagated: they must not stop the record write.
        for (registration, delivery) in &results {
            if *delivery == ProviderDelivery::FailedPermanent {
                if let Err(e) = DeviceRegistryService::mark_invalid(&pool, registration.id).await {
                    log::error!(
                        "Failed to invalidate registration {}: {}",
                        registration.id,
                        e
                    );
                }
            }
        }

        // Always executed, even with zero handles or all sends failed.
        // A failure here is the one hard failure of a dispatch call.
        let record = NotificationService::create(
            &pool,
            intent.user_id,
            &intent.title,
            &intent.body,
            intent.category,
        )
        .await?;

        let mut providers: HashMap<PushProviderKind, ProviderDelivery> = HashMap::new();
        for (registration, delivery) in results {
            providers
                .entry(registration.provider)
                .and_modify(|existing| {
                    if delivery_rank(delivery) < delivery_rank(*existing) {
                        *existing = delivery;
                    }
                })
                .or_insert(delivery);
        }

        log::info!(
            "Dispatched notification {} to user {}: {:?}",
            record.id,
            intent.user_id,
            providers
        );

        Ok(DispatchOutcome {
            notification_id: record.id,
            providers,
        })
    }
}

/// Fold precedence when a user has several handles on one provider: one
/// live device counts as delivery, a retryable failure outranks a dead
/// handle, and skipped only survives if nothing was attempted.
fn delivery_rank(delivery: ProviderDelivery) -> u8 {
    match delivery {
        ProviderDelivery::Sent => 0,
        ProviderDelivery::FailedTransient => 1,
        ProviderDelivery::FailedPermanent => 2,
        ProviderDelivery::SkippedUnconfigured => 3,
    }
}
