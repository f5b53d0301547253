//! Operations context for dependency injection

use nxfw_config::Config;
use nxfw_errors::{Error, OpsError};
use nxfw_events::{EventEmitter, EventSender};
use nxfw_net::{CdnClient, RetryPolicy};
use nxfw_resolver::{ContainerCodec, ResolverConfig};
use std::sync::Arc;

/// Operations context providing access to all system components
pub struct OpsCtx {
    /// CDN client shared by the update checker and the resolver
    pub client: Arc<CdnClient>,
    /// Container decoder used for every metadata blob
    pub codec: Arc<dyn ContainerCodec>,
    /// Event sender for progress reporting
    pub tx: EventSender,
    /// System configuration
    pub config: Config,
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

impl OpsCtx {
    /// Resolver settings derived from the configuration
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            max_depth: self.config.resolver.max_depth,
            parallel_downloads: self.config.general.parallel_downloads,
            verify_content_hash: self.config.cdn.verify_content_hash,
            retry: RetryPolicy::new(self.config.network.retries, self.config.retry_delay()),
        }
    }
}

/// Builder for the operations context
#[derive(Default)]
pub struct OpsContextBuilder {
    client: Option<Arc<CdnClient>>,
    codec: Option<Arc<dyn ContainerCodec>>,
    tx: Option<EventSender>,
    config: Option<Config>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set CDN client
    #[must_use]
    pub fn with_client(mut self, client: CdnClient) -> Self {
        self.client = Some(Arc::new(client));
        self
    }

    /// Set container codec
    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn ContainerCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Set configuration; defaults apply when omitted
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if any required component is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let client = self.client.ok_or_else(|| OpsError::MissingComponent {
            component: "client".to_string(),
        })?;

        let codec = self.codec.ok_or_else(|| OpsError::MissingComponent {
            component: "codec".to_string(),
        })?;

        let tx = self.tx.ok_or_else(|| OpsError::MissingComponent {
            component: "event_sender".to_string(),
        })?;

        Ok(OpsCtx {
            client,
            codec,
            tx,
            config: self.config.unwrap_or_default(),
        })
    }
}
