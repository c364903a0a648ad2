//! The services a flow runs against.

use std::fmt;
use std::sync::Arc;

use paperflow_builder::{AttachmentStore, SigningService, StateResolver};
use paperflow_finality::FinalityProtocol;
use paperflow_types::{Clock, FlowConfig, Party, Result, SystemClock};

/// Identity, collaborators, clock and configuration for one node's flows.
///
/// Cheap to clone; every collaborator is shared behind an `Arc`. Flows
/// running concurrently from clones of one context share no mutable state
/// of their own.
#[derive(Clone)]
pub struct FlowContext {
    pub(crate) me: Party,
    pub(crate) resolver: Arc<dyn StateResolver>,
    pub(crate) attachments: Arc<dyn AttachmentStore>,
    pub(crate) signer: Arc<dyn SigningService>,
    pub(crate) finality: Arc<dyn FinalityProtocol>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: FlowConfig,
}

impl FlowContext {
    /// A context for `me` on the wall clock with default configuration.
    #[must_use]
    pub fn new(
        me: Party,
        resolver: Arc<dyn StateResolver>,
        attachments: Arc<dyn AttachmentStore>,
        signer: Arc<dyn SigningService>,
        finality: Arc<dyn FinalityProtocol>,
    ) -> Self {
        Self {
            me,
            resolver,
            attachments,
            signer,
            finality,
            clock: Arc::new(SystemClock),
            config: FlowConfig::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the configuration.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation.
    pub fn with_config(mut self, config: FlowConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Swap the state resolver, keeping everything else.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn StateResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Swap the finality protocol, keeping everything else.
    #[must_use]
    pub fn with_finality(mut self, finality: Arc<dyn FinalityProtocol>) -> Self {
        self.finality = finality;
        self
    }

    /// The local party.
    #[must_use]
    pub fn me(&self) -> &Party {
        &self.me
    }

    #[must_use]
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }
}

impl fmt::Debug for FlowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowContext")
            .field("me", &self.me)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
