//! Process-wide settings handle.
//!
//! The application's composition root owns one [`SettingsRoot`] and passes
//! it to whatever needs settings. The provider behind it is built on first
//! access and lives until the handle is dropped; all I/O is request-scoped,
//! so there is nothing to tear down.

use std::sync::{Arc, OnceLock};

use tracing::warn;

use crate::migrate::MigrationOutcome;
use crate::provider::local::{LocalSettingsProvider, StoreOptions};
use crate::value::KnownTypes;

pub struct SettingsRoot {
    options: StoreOptions,
    known: KnownTypes,
    provider: OnceLock<Arc<LocalSettingsProvider>>,
}

impl SettingsRoot {
    pub fn new(options: StoreOptions, known: KnownTypes) -> Self {
        Self {
            options,
            known,
            provider: OnceLock::new(),
        }
    }

    /// The shared provider, constructed on first call.
    pub fn provider(&self) -> Arc<LocalSettingsProvider> {
        let provider = self
            .provider
            .get_or_init(|| Arc::new(LocalSettingsProvider::new(&self.options, self.known.clone())));
        Arc::clone(provider)
    }

    /// Runs the load-or-migrate step and hands back the provider.
    ///
    /// Never fails: if loading errors out, the error is logged, the
    /// application continues with empty settings and the outcome is
    /// [`MigrationOutcome::Failed`]. An unreadable current document also
    /// blocks saving, so it is left on disk as it was.
    pub async fn startup(&self) -> (Arc<LocalSettingsProvider>, MigrationOutcome) {
        let provider = self.provider();
        let outcome = match provider.load_or_migrate().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "failed to load settings, continuing with defaults");
                provider.clear().await;
                MigrationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        (provider, outcome)
    }
}
