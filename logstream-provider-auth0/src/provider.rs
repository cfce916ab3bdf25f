//! Auth0 Provider implementation
//!
//! This module contains the resource operations for `log_stream`. Each
//! operation maps attributes through [`expand`]/[`flatten`] and issues one
//! Management API call, reconciling with a fresh read afterwards.

use log::{debug, info};
use logstream_core::provider::{ProviderError, ProviderResult};
use logstream_core::resource::{Resource, ResourceId, State};
use logstream_core::schema::ResourceSchema;

use crate::config::ManagementConfig;
use crate::log_stream::{LogStreamConfig, expand, flatten};
use crate::management::{LogStreamApi, ManagementClient, ManagementError};
use crate::schema::{LOG_STREAM, log_stream_schema};

impl From<ManagementError> for ProviderError {
    fn from(e: ManagementError) -> Self {
        ProviderError::new(e.to_string()).with_cause(e)
    }
}

/// Auth0 Provider
pub struct Auth0Provider<C = ManagementClient> {
    client: C,
    schema: ResourceSchema,
}

impl Auth0Provider<ManagementClient> {
    /// Create a provider talking to the Management API described by `config`
    pub fn new(config: &ManagementConfig) -> ProviderResult<Self> {
        let client = ManagementClient::new(config).map_err(|e| {
            ProviderError::new(format!("Failed to build Management API client: {}", e))
                .with_cause(e)
        })?;
        Ok(Self::with_client(client))
    }

    /// Create a provider from `AUTH0_*` environment variables
    pub fn from_env() -> ProviderResult<Self> {
        let config = ManagementConfig::from_env()
            .map_err(|e| ProviderError::new(e.to_string()).with_cause(e))?;
        Self::new(&config)
    }
}

impl<C: LogStreamApi> Auth0Provider<C> {
    pub fn with_client(client: C) -> Self {
        Self {
            client,
            schema: log_stream_schema(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    fn check_resource_type(&self, id: &ResourceId) -> ProviderResult<()> {
        if id.resource_type == LOG_STREAM {
            Ok(())
        } else {
            Err(
                ProviderError::new(format!("Unknown resource type: {}", id.resource_type))
                    .for_resource(id.clone()),
            )
        }
    }

    /// Reject a resource that violates the schema before any API call
    pub fn validate(&self, resource: &Resource) -> ProviderResult<()> {
        self.check_resource_type(&resource.id)?;
        self.schema.validate(&resource.attributes).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ProviderError::new(format!("Invalid configuration: {}", messages.join("; ")))
                .for_resource(resource.id.clone())
        })
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Read a log stream
    ///
    /// A missing identifier or a stream that no longer exists yields
    /// `State::not_found`.
    pub async fn read_resource(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> ProviderResult<State> {
        self.check_resource_type(id)?;

        let identifier = match identifier {
            Some(identifier) => identifier,
            None => return Ok(State::not_found(id.clone())),
        };

        let record = match self.client.read(identifier).await {
            Ok(record) => record,
            Err(e) if e.is_not_found() => {
                info!("{} ({}) no longer exists", id, identifier);
                return Ok(State::not_found(id.clone()));
            }
            Err(e) => return Err(ProviderError::from(e).for_resource(id.clone())),
        };

        let identifier = record.id.clone().unwrap_or_else(|| identifier.to_string());
        let attributes = flatten(&record).into_attributes();
        debug!("read {}: {:?}", id, self.schema.redact(&attributes));

        Ok(State::existing(id.clone(), attributes).with_identifier(identifier))
    }

    /// Create a log stream and read it back
    pub async fn create_resource(&self, resource: &Resource) -> ProviderResult<State> {
        self.check_resource_type(&resource.id)?;

        let config = LogStreamConfig::from_attributes(&resource.attributes)
            .map_err(|e| e.for_resource(resource.id.clone()))?;
        let record = expand(&config);
        debug!(
            "creating {}: {:?}",
            resource.id,
            self.schema.redact(&resource.attributes)
        );

        let created = self
            .client
            .create(&record)
            .await
            .map_err(|e| ProviderError::from(e).for_resource(resource.id.clone()))?;

        let identifier = created.id.ok_or_else(|| {
            ProviderError::new("Management API returned no log stream id")
                .for_resource(resource.id.clone())
        })?;
        info!("created {} ({})", resource.id, identifier);

        self.read_resource(&resource.id, Some(&identifier)).await
    }

    /// Update the mutable fields of a log stream and read it back
    pub async fn update_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
        to: &Resource,
    ) -> ProviderResult<State> {
        self.check_resource_type(id)?;

        let config = LogStreamConfig::from_attributes(&to.attributes)
            .map_err(|e| e.for_resource(id.clone()))?;
        let payload = expand(&config).into_update_payload();

        self.client
            .update(identifier, &payload)
            .await
            .map_err(|e| ProviderError::from(e).for_resource(id.clone()))?;
        info!("updated {} ({})", id, identifier);

        self.read_resource(id, Some(identifier)).await
    }

    /// Delete a log stream; one that is already gone counts as deleted
    pub async fn delete_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        self.check_resource_type(id)?;

        match self.client.delete(identifier).await {
            Ok(()) => {
                info!("deleted {} ({})", id, identifier);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                info!("{} ({}) was already deleted", id, identifier);
                Ok(())
            }
            Err(e) => Err(ProviderError::from(e).for_resource(id.clone())),
        }
    }

    /// Adopt an existing log stream by its identifier
    pub async fn import_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<State> {
        let state = self.read_resource(id, Some(identifier)).await?;
        if state.exists {
            Ok(state)
        } else {
            Err(
                ProviderError::new(format!("Cannot import non-existent log stream {}", identifier))
                    .for_resource(id.clone()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_stream::{LogStreamRecord, attr};
    use crate::sink::{EventBridgeSink, HttpSink, Sink};
    use async_trait::async_trait;
    use logstream_core::differ::{Diff, diff};
    use logstream_core::provider::Provider;
    use logstream_core::resource::Value;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory Management API
    #[derive(Default)]
    struct FakeApi {
        streams: Mutex<HashMap<String, LogStreamRecord>>,
        updates: Mutex<Vec<LogStreamRecord>>,
        fail_with: Mutex<Option<u16>>,
    }

    impl FakeApi {
        fn failure(&self) -> Result<(), ManagementError> {
            match *self.fail_with.lock().unwrap() {
                Some(status) => Err(ManagementError::Api {
                    status,
                    error: "Internal Server Error".to_string(),
                    message: "try again later".to_string(),
                    error_code: None,
                }),
                None => Ok(()),
            }
        }

        fn not_found() -> ManagementError {
            ManagementError::Api {
                status: 404,
                error: "Not Found".to_string(),
                message: "The log stream does not exist".to_string(),
                error_code: Some("inexistent_log_stream".to_string()),
            }
        }
    }

    #[async_trait]
    impl LogStreamApi for FakeApi {
        async fn create(
            &self,
            record: &LogStreamRecord,
        ) -> Result<LogStreamRecord, ManagementError> {
            self.failure()?;
            let mut streams = self.streams.lock().unwrap();
            let id = format!("lst_{:016}", streams.len() + 1);
            let mut stored = record.clone();
            stored.id = Some(id.clone());
            stored.status.get_or_insert_with(|| "active".to_string());
            if let Some(Sink::EventBridge(s)) = &mut stored.sink {
                s.aws_partner_event_source = Some(format!("aws.partner/auth0.com/{}", id));
            }
            streams.insert(id, stored.clone());
            Ok(stored)
        }

        async fn read(&self, id: &str) -> Result<LogStreamRecord, ManagementError> {
            self.failure()?;
            self.streams
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(Self::not_found)
        }

        async fn update(
            &self,
            id: &str,
            record: &LogStreamRecord,
        ) -> Result<LogStreamRecord, ManagementError> {
            self.failure()?;
            self.updates.lock().unwrap().push(record.clone());
            let mut streams = self.streams.lock().unwrap();
            let stored = streams.get_mut(id).ok_or_else(Self::not_found)?;
            if record.name.is_some() {
                stored.name = record.name.clone();
            }
            if record.status.is_some() {
                stored.status = record.status.clone();
            }
            Ok(stored.clone())
        }

        async fn delete(&self, id: &str) -> Result<(), ManagementError> {
            self.failure()?;
            self.streams
                .lock()
                .unwrap()
                .remove(id)
                .map(|_| ())
                .ok_or_else(Self::not_found)
        }
    }

    fn provider() -> Auth0Provider<FakeApi> {
        let _ = env_logger::builder().is_test(true).try_init();
        Auth0Provider::with_client(FakeApi::default())
    }

    fn eventbridge() -> Resource {
        Resource::new(LOG_STREAM, "aws")
            .with_attribute(attr::NAME, "aws-logs")
            .with_attribute(attr::TYPE, "eventbridge")
            .with_attribute(attr::AWS_ACCOUNT_ID, "999999999999")
            .with_attribute(attr::AWS_REGION, "us-west-2")
    }

    #[tokio::test]
    async fn create_then_read_reconciles_computed_fields() {
        let provider = provider();
        let resource = eventbridge();

        let state = provider.create_resource(&resource).await.unwrap();

        assert!(state.exists);
        assert_eq!(state.identifier.as_deref(), Some("lst_0000000000000001"));
        for key in [attr::NAME, attr::TYPE, attr::AWS_ACCOUNT_ID, attr::AWS_REGION] {
            assert_eq!(state.attributes.get(key), resource.attributes.get(key), "{}", key);
        }
        assert_eq!(
            state.attributes.get(attr::STATUS),
            Some(&Value::String("active".to_string()))
        );
        assert_eq!(
            state.attributes.get(attr::AWS_PARTNER_EVENT_SOURCE),
            Some(&Value::String(
                "aws.partner/auth0.com/lst_0000000000000001".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn read_missing_stream_clears_identifier() {
        let provider = provider();
        let id = ResourceId::new(LOG_STREAM, "gone");

        let state = provider.read_resource(&id, Some("lst_missing")).await.unwrap();
        assert!(!state.exists);
        assert!(state.identifier.is_none());
    }

    #[tokio::test]
    async fn read_without_identifier_is_not_found() {
        let provider = provider();
        let state = provider
            .read_resource(&ResourceId::new(LOG_STREAM, "new"), None)
            .await
            .unwrap();
        assert!(!state.exists);
    }

    #[tokio::test]
    async fn delete_missing_stream_succeeds() {
        let provider = provider();
        let id = ResourceId::new(LOG_STREAM, "gone");
        provider.delete_resource(&id, "lst_missing").await.unwrap();
    }

    #[tokio::test]
    async fn delete_removes_stream() {
        let provider = provider();
        let resource = eventbridge();
        let state = provider.create_resource(&resource).await.unwrap();
        let identifier = state.identifier.unwrap();

        provider
            .delete_resource(&resource.id, &identifier)
            .await
            .unwrap();
        let state = provider
            .read_resource(&resource.id, Some(&identifier))
            .await
            .unwrap();
        assert!(!state.exists);
    }

    #[tokio::test]
    async fn update_sends_only_mutable_fields() {
        let provider = provider();
        let resource = eventbridge();
        let created = provider.create(&resource).await.unwrap();
        let identifier = created.identifier.clone().unwrap();

        let changed = resource.clone().with_attribute(attr::STATUS, "paused");
        let state = provider
            .update(&resource.id, &identifier, &created, &changed)
            .await
            .unwrap();
        assert_eq!(
            state.attributes.get(attr::STATUS),
            Some(&Value::String("paused".to_string()))
        );
        assert_eq!(
            state.attributes.get(attr::AWS_PARTNER_EVENT_SOURCE),
            created.attributes.get(attr::AWS_PARTNER_EVENT_SOURCE)
        );

        let updates = provider.client().updates.lock().unwrap();
        let sent = &updates[0];
        assert_eq!(sent.id, None);
        assert_eq!(sent.stream_type, None);
        assert_eq!(
            sent.sink,
            Some(Sink::EventBridge(EventBridgeSink {
                aws_account_id: Some("999999999999".to_string()),
                aws_region: Some("us-west-2".to_string()),
                aws_partner_event_source: None,
            }))
        );
    }

    #[tokio::test]
    async fn update_rejects_read_only_partner_fields() {
        let provider = provider();
        let resource = eventbridge();
        let created = provider.create(&resource).await.unwrap();
        let identifier = created.identifier.clone().unwrap();

        let changed = resource
            .clone()
            .with_attribute(attr::AWS_PARTNER_EVENT_SOURCE, "aws.partner/auth0.com/other");
        let err = provider
            .update(&resource.id, &identifier, &created, &changed)
            .await
            .unwrap_err();
        assert!(err.message.contains("'aws_partner_event_source' is computed"));
        assert!(provider.client().updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mixed_case_type_is_sent_lowercase_with_its_sink() {
        let provider = provider();
        let resource = Resource::new(LOG_STREAM, "web")
            .with_attribute(attr::NAME, "web")
            .with_attribute(attr::TYPE, "HTTP")
            .with_attribute(attr::HTTP_ENDPOINT, "https://example.com/logs")
            .with_attribute(attr::HTTP_CONTENT_TYPE, "application/json")
            .with_attribute(attr::HTTP_CONTENT_FORMAT, "JSONLINES")
            .with_attribute(attr::HTTP_AUTHORIZATION, "Bearer abc");

        let state = provider.create(&resource).await.unwrap();
        let identifier = state.identifier.clone().unwrap();

        let stored = provider.client().streams.lock().unwrap()[&identifier].clone();
        assert_eq!(stored.stream_type.as_deref(), Some("http"));
        assert_eq!(
            stored.sink,
            Some(Sink::Http(HttpSink {
                http_endpoint: Some("https://example.com/logs".to_string()),
                http_content_type: Some("application/json".to_string()),
                http_content_format: Some("JSONLINES".to_string()),
                http_authorization: Some("Bearer abc".to_string()),
                http_custom_headers: None,
            }))
        );
        assert_eq!(
            state.attributes.get(attr::TYPE),
            Some(&Value::String("http".to_string()))
        );
        assert_eq!(
            diff(&resource, &state, provider.schema()),
            Diff::NoChange(resource.id.clone())
        );
    }

    #[tokio::test]
    async fn api_errors_propagate_verbatim() {
        let provider = provider();
        *provider.client().fail_with.lock().unwrap() = Some(500);

        let err = provider.create_resource(&eventbridge()).await.unwrap_err();
        assert_eq!(err.message, "500 Internal Server Error: try again later");
        assert_eq!(
            err.cause_as::<ManagementError>()
                .and_then(ManagementError::status),
            Some(500)
        );

        let err = provider
            .delete_resource(&ResourceId::new(LOG_STREAM, "x"), "lst_1")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "[log_stream.x] 500 Internal Server Error: try again later");
    }

    #[tokio::test]
    async fn unknown_resource_type_is_rejected() {
        let provider = provider();
        let err = provider
            .read_resource(&ResourceId::new("client", "app"), Some("abc"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Unknown resource type: client");
    }

    #[tokio::test]
    async fn import_requires_existing_stream() {
        let provider = provider();
        let resource = eventbridge();
        let created = provider.create_resource(&resource).await.unwrap();
        let identifier = created.identifier.unwrap();

        let imported = provider
            .import_resource(&ResourceId::new(LOG_STREAM, "adopted"), &identifier)
            .await
            .unwrap();
        assert_eq!(imported.identifier, Some(identifier));

        let err = provider
            .import_resource(&ResourceId::new(LOG_STREAM, "ghost"), "lst_missing")
            .await
            .unwrap_err();
        assert!(err.message.contains("lst_missing"));
    }

    #[test]
    fn validate_rejects_conflicting_groups() {
        let provider = provider();
        let resource = eventbridge().with_attribute(attr::SPLUNK_TOKEN, "token");

        let err = provider.validate(&resource).unwrap_err();
        assert!(err.message.starts_with("Invalid configuration:"));
        assert!(err.message.contains("'aws_account_id' conflicts with 'splunk_token'"));
    }
}
