//! Shared application state injected into every handler.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{
    AllocationPolicy, HistoryService, LinkService, RedirectService, SessionService,
};
use crate::config::Config;
use crate::domain::repositories::{RecordRepository, UserRepository};
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::CodeGenerator;
use crate::utils::session_token::SessionSigner;

/// Settings the services are built from.
///
/// Kept separate from [`Config`] so that tests can build state without
/// touching the environment.
#[derive(Debug, Clone)]
pub struct StateOptions {
    pub base_url: String,
    pub session_signing_secret: String,
    pub session_ttl: Duration,
    pub cookie_secure: bool,
    pub code_length: usize,
    pub policy: AllocationPolicy,
}

impl From<&Config> for StateOptions {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            session_signing_secret: config.session_signing_secret.clone(),
            session_ttl: Duration::from_secs(config.session_ttl_seconds),
            cookie_secure: config.cookie_secure,
            code_length: config.code_length,
            policy: AllocationPolicy {
                max_attempts: config.max_allocation_attempts,
                dedup_by_destination: config.dedup_by_destination,
                store_timeout: Duration::from_secs(config.store_timeout_seconds),
            },
        }
    }
}

/// Application state, cheap to clone.
///
/// Services hold the repositories as trait objects so the same state type
/// serves both the PostgreSQL and the in-memory backend.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn RecordRepository, dyn UserRepository>>,
    pub redirect_service: Arc<RedirectService<dyn RecordRepository>>,
    pub session_service: Arc<SessionService<dyn UserRepository>>,
    pub history_service: Arc<HistoryService<dyn UserRepository, dyn RecordRepository>>,
    pub record_repository: Arc<dyn RecordRepository>,
    pub cache: Arc<dyn CacheService>,
    pub base_url: String,
    pub cookie_secure: bool,
}

impl AppState {
    /// Wires every service over the given repositories and cache.
    pub fn new(
        record_repository: Arc<dyn RecordRepository>,
        user_repository: Arc<dyn UserRepository>,
        cache: Arc<dyn CacheService>,
        options: StateOptions,
    ) -> Self {
        let store_timeout = options.policy.store_timeout;

        let history_service = Arc::new(HistoryService::new(
            user_repository.clone(),
            record_repository.clone(),
            store_timeout,
        ));

        let link_service = Arc::new(LinkService::new(
            record_repository.clone(),
            history_service.clone(),
            CodeGenerator::new(options.code_length),
            options.policy,
        ));

        let redirect_service = Arc::new(RedirectService::new(
            record_repository.clone(),
            cache.clone(),
            store_timeout,
        ));

        let session_service = Arc::new(SessionService::new(
            user_repository,
            SessionSigner::new(&options.session_signing_secret),
            options.session_ttl,
            store_timeout,
        ));

        Self {
            link_service,
            redirect_service,
            session_service,
            history_service,
            record_repository,
            cache,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            cookie_secure: options.cookie_secure,
        }
    }

    /// Renders the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }
}
