//! Logstream Auth0 Provider
//!
//! Manages Auth0 log streams through the Management API.
//!
//! ## Module Structure
//!
//! - `config` - Management API connection settings
//! - `management` - HTTP client and the `LogStreamApi` seam
//! - `sink` - Sink payloads (EventBridge, EventGrid, HTTP, Datadog, Splunk)
//! - `log_stream` - Records, flat configuration, `expand`/`flatten`
//! - `schema` - Attribute schema of `log_stream`
//! - `provider` - Auth0Provider implementation

pub mod config;
pub mod log_stream;
pub mod management;
pub mod provider;
pub mod schema;
pub mod sink;

// Re-export main types
pub use config::{ConfigError, ManagementConfig};
pub use log_stream::{LogStreamConfig, LogStreamRecord, expand, flatten};
pub use management::{LogStreamApi, ManagementClient, ManagementError};
pub use provider::Auth0Provider;
pub use sink::Sink;

use logstream_core::provider::{BoxFuture, Provider, ProviderResult, ResourceType};
use logstream_core::resource::{Resource, ResourceId, State};

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl<C: LogStreamApi> Provider for Auth0Provider<C> {
    fn name(&self) -> &'static str {
        "auth0"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        vec![Box::new(schema::LogStreamType)]
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.map(|s| s.to_string());
        Box::pin(async move { self.read_resource(&id, identifier.as_deref()).await })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move {
            self.validate(&resource)?;
            self.create_resource(&resource).await
        })
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        _from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let to = to.clone();
        Box::pin(async move {
            self.validate(&to)?;
            self.update_resource(&id, &identifier, &to).await
        })
    }

    fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.delete_resource(&id, &identifier).await })
    }
}
