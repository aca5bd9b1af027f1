//! avp-dash library interface
//!
//! Client core of the image processing dashboard: backend client, upload
//! pipeline, refresh orchestration and session state. Exposed as a library
//! for the `avp-dash` binary and integration tests.

pub mod error;
pub mod report;
pub mod services;
pub mod session;

pub use crate::error::{ClientError, EncodingError, FetchError, ValidationError};

use std::sync::Arc;

use avp_common::config::DashboardConfig;
use avp_common::events::EventBus;

use crate::services::{DashboardClient, RefreshOrchestrator, UploadSubmitter, UploadWorkflow};
use crate::session::DashboardSession;

/// Wired-up dashboard components sharing one client and event bus
#[derive(Clone)]
pub struct Dashboard {
    pub config: DashboardConfig,
    pub client: DashboardClient,
    pub event_bus: EventBus,
    pub orchestrator: Arc<RefreshOrchestrator>,
    pub workflow: Arc<UploadWorkflow>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Result<Self, ClientError> {
        let client = DashboardClient::new(&config.api_base_url)?;
        let event_bus = EventBus::new(100);

        let orchestrator = Arc::new(RefreshOrchestrator::new(client.clone(), event_bus.clone()));
        let workflow = Arc::new(UploadWorkflow::new(
            UploadSubmitter::new(client.clone()),
            Arc::clone(&orchestrator),
            event_bus.clone(),
            config.refresh_delay(),
        ));

        Ok(Self {
            config,
            client,
            event_bus,
            orchestrator,
            workflow,
        })
    }

    /// New interactive session over this dashboard's upload workflow
    pub fn session(&self) -> DashboardSession {
        DashboardSession::new(Arc::clone(&self.workflow))
    }
}
