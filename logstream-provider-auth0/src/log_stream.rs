//! Log stream model and the mapping between flat configuration and records
//!
//! - [`LogStreamConfig`] is the flat view the caller declares: one optional
//!   field group per sink type.
//! - [`LogStreamRecord`] is the shape the Management API speaks.
//! - [`expand`] and [`flatten`] convert between the two.

use std::collections::{BTreeSet, HashMap};

use log::warn;
use logstream_core::provider::{ProviderError, ProviderResult};
use logstream_core::resource::Value;
use serde::{Deserialize, Serialize};

use crate::sink::{
    DatadogSink, EventBridgeSink, EventGridSink, HttpSink, Sink, SplunkSink, TYPE_DATADOG,
    TYPE_EVENTBRIDGE, TYPE_EVENTGRID, TYPE_HTTP, TYPE_SPLUNK,
};

pub const LOG_STREAM_STATUSES: [&str; 3] = ["active", "paused", "suspended"];

/// Flat attribute keys
pub mod attr {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const STATUS: &str = "status";

    pub const AWS_ACCOUNT_ID: &str = "aws_account_id";
    pub const AWS_REGION: &str = "aws_region";
    pub const AWS_PARTNER_EVENT_SOURCE: &str = "aws_partner_event_source";

    pub const AZURE_SUBSCRIPTION_ID: &str = "azure_subscription_id";
    pub const AZURE_RESOURCE_GROUP: &str = "azure_resource_group";
    pub const AZURE_REGION: &str = "azure_region";
    pub const AZURE_PARTNER_TOPIC: &str = "azure_partner_topic";

    pub const HTTP_ENDPOINT: &str = "http_endpoint";
    pub const HTTP_CONTENT_TYPE: &str = "http_content_type";
    pub const HTTP_CONTENT_FORMAT: &str = "http_content_format";
    pub const HTTP_AUTHORIZATION: &str = "http_authorization";
    pub const HTTP_CUSTOM_HEADERS: &str = "http_custom_headers";

    pub const DATADOG_REGION: &str = "datadog_region";
    pub const DATADOG_API_KEY: &str = "datadog_api_key";

    pub const SPLUNK_DOMAIN: &str = "splunk_domain";
    pub const SPLUNK_TOKEN: &str = "splunk_token";
    pub const SPLUNK_PORT: &str = "splunk_port";
    pub const SPLUNK_SECURE: &str = "splunk_secure";
}

/// A log stream as the Management API returns and accepts it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLogStream")]
pub struct LogStreamRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub stream_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sink: Option<Sink>,
}

/// Wire shape before the sink is classified
#[derive(Deserialize)]
struct RawLogStream {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    stream_type: Option<String>,
    status: Option<String>,
    sink: Option<serde_json::Value>,
}

impl TryFrom<RawLogStream> for LogStreamRecord {
    type Error = serde_json::Error;

    fn try_from(raw: RawLogStream) -> Result<Self, Self::Error> {
        let sink = match raw.sink {
            Some(serde_json::Value::Null) | None => None,
            Some(value) => Some(Sink::decode(raw.stream_type.as_deref(), value)?),
        };
        Ok(Self {
            id: raw.id,
            name: raw.name,
            stream_type: raw.stream_type,
            status: raw.status,
            sink,
        })
    }
}

impl LogStreamRecord {
    /// The subset of this record the API accepts on update
    ///
    /// `id` and `type` are immutable, partner names are assigned remotely.
    pub fn into_update_payload(self) -> Self {
        Self {
            id: None,
            stream_type: None,
            sink: self.sink.map(Sink::without_read_only),
            ..self
        }
    }
}

/// Flat configuration of one log stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogStreamConfig {
    pub name: String,
    pub stream_type: String,
    pub status: Option<String>,

    pub aws_account_id: Option<String>,
    pub aws_region: Option<String>,
    pub aws_partner_event_source: Option<String>,

    pub azure_subscription_id: Option<String>,
    pub azure_resource_group: Option<String>,
    pub azure_region: Option<String>,
    pub azure_partner_topic: Option<String>,

    pub http_endpoint: Option<String>,
    pub http_content_type: Option<String>,
    pub http_content_format: Option<String>,
    pub http_authorization: Option<String>,
    pub http_custom_headers: Option<BTreeSet<String>>,

    pub datadog_region: Option<String>,
    pub datadog_api_key: Option<String>,

    pub splunk_domain: Option<String>,
    pub splunk_token: Option<String>,
    pub splunk_port: Option<String>,
    pub splunk_secure: Option<bool>,
}

/// Build the API record for a configuration
///
/// Exactly one sink is built, chosen by `stream_type`. An unknown type yields
/// a record without a sink; nothing rejects it here.
pub fn expand(config: &LogStreamConfig) -> LogStreamRecord {
    let sink = match config.stream_type.as_str() {
        TYPE_EVENTBRIDGE => Some(Sink::EventBridge(EventBridgeSink {
            aws_account_id: config.aws_account_id.clone(),
            aws_region: config.aws_region.clone(),
            aws_partner_event_source: None,
        })),
        TYPE_EVENTGRID => Some(Sink::EventGrid(EventGridSink {
            azure_subscription_id: config.azure_subscription_id.clone(),
            azure_resource_group: config.azure_resource_group.clone(),
            azure_region: config.azure_region.clone(),
            azure_partner_topic: None,
        })),
        TYPE_HTTP => Some(Sink::Http(HttpSink {
            http_endpoint: config.http_endpoint.clone(),
            http_content_type: config.http_content_type.clone(),
            http_content_format: config.http_content_format.clone(),
            http_authorization: config.http_authorization.clone(),
            http_custom_headers: config
                .http_custom_headers
                .as_ref()
                .map(|headers| headers.iter().cloned().collect()),
        })),
        TYPE_DATADOG => Some(Sink::Datadog(DatadogSink {
            datadog_region: config.datadog_region.clone(),
            datadog_api_key: config.datadog_api_key.clone(),
        })),
        TYPE_SPLUNK => Some(Sink::Splunk(SplunkSink {
            splunk_domain: config.splunk_domain.clone(),
            splunk_token: config.splunk_token.clone(),
            splunk_port: config.splunk_port.clone(),
            splunk_secure: config.splunk_secure,
        })),
        other => {
            warn!(
                "log stream type '{}' is not supported by this provider, sending it without a sink",
                other
            );
            None
        }
    };

    LogStreamRecord {
        id: None,
        name: Some(config.name.clone()),
        stream_type: Some(config.stream_type.clone()),
        status: config.status.clone(),
        sink,
    }
}

/// Build the flat configuration for an API record
///
/// Sink fields are taken from the sink's own shape, not from the record's
/// `type`. A sink of unknown shape contributes nothing.
pub fn flatten(record: &LogStreamRecord) -> LogStreamConfig {
    let mut config = LogStreamConfig {
        name: record.name.clone().unwrap_or_default(),
        stream_type: record.stream_type.clone().unwrap_or_default(),
        status: record.status.clone(),
        ..Default::default()
    };

    match &record.sink {
        Some(Sink::EventBridge(s)) => {
            config.aws_account_id = s.aws_account_id.clone();
            config.aws_region = s.aws_region.clone();
            config.aws_partner_event_source = s.aws_partner_event_source.clone();
        }
        Some(Sink::EventGrid(s)) => {
            config.azure_subscription_id = s.azure_subscription_id.clone();
            config.azure_resource_group = s.azure_resource_group.clone();
            config.azure_region = s.azure_region.clone();
            config.azure_partner_topic = s.azure_partner_topic.clone();
        }
        Some(Sink::Http(s)) => {
            config.http_endpoint = s.http_endpoint.clone();
            config.http_content_type = s.http_content_type.clone();
            config.http_content_format = s.http_content_format.clone();
            config.http_authorization = s.http_authorization.clone();
            config.http_custom_headers = s
                .http_custom_headers
                .as_ref()
                .map(|headers| headers.iter().cloned().collect());
        }
        Some(Sink::Datadog(s)) => {
            config.datadog_region = s.datadog_region.clone();
            config.datadog_api_key = s.datadog_api_key.clone();
        }
        Some(Sink::Splunk(s)) => {
            config.splunk_domain = s.splunk_domain.clone();
            config.splunk_token = s.splunk_token.clone();
            config.splunk_port = s.splunk_port.clone();
            config.splunk_secure = s.splunk_secure;
        }
        Some(Sink::Other(_)) | None => {}
    }

    config
}

// =============================================================================
// Attribute conversion
// =============================================================================

impl LogStreamConfig {
    /// Read a configuration from a generic attribute map
    pub fn from_attributes(attributes: &HashMap<String, Value>) -> ProviderResult<Self> {
        let reader = AttributeReader(attributes);

        Ok(Self {
            name: reader.required_string(attr::NAME)?,
            stream_type: reader.required_string(attr::TYPE)?.to_ascii_lowercase(),
            status: reader.string(attr::STATUS)?,

            aws_account_id: reader.string(attr::AWS_ACCOUNT_ID)?,
            aws_region: reader.string(attr::AWS_REGION)?,
            aws_partner_event_source: reader.string(attr::AWS_PARTNER_EVENT_SOURCE)?,

            azure_subscription_id: reader.string(attr::AZURE_SUBSCRIPTION_ID)?,
            azure_resource_group: reader.string(attr::AZURE_RESOURCE_GROUP)?,
            azure_region: reader.string(attr::AZURE_REGION)?,
            azure_partner_topic: reader.string(attr::AZURE_PARTNER_TOPIC)?,

            http_endpoint: reader.string(attr::HTTP_ENDPOINT)?,
            http_content_type: reader.string(attr::HTTP_CONTENT_TYPE)?,
            http_content_format: reader.string(attr::HTTP_CONTENT_FORMAT)?,
            http_authorization: reader.string(attr::HTTP_AUTHORIZATION)?,
            http_custom_headers: reader.string_set(attr::HTTP_CUSTOM_HEADERS)?,

            datadog_region: reader.string(attr::DATADOG_REGION)?,
            datadog_api_key: reader.string(attr::DATADOG_API_KEY)?,

            splunk_domain: reader.string(attr::SPLUNK_DOMAIN)?,
            splunk_token: reader.string(attr::SPLUNK_TOKEN)?,
            splunk_port: reader.string(attr::SPLUNK_PORT)?,
            splunk_secure: reader.bool(attr::SPLUNK_SECURE)?,
        })
    }

    /// Convert into a generic attribute map, leaving out absent fields
    pub fn into_attributes(self) -> HashMap<String, Value> {
        let mut attributes = HashMap::new();
        attributes.insert(attr::NAME.to_string(), Value::String(self.name));
        attributes.insert(attr::TYPE.to_string(), Value::String(self.stream_type));

        let strings = [
            (attr::STATUS, self.status),
            (attr::AWS_ACCOUNT_ID, self.aws_account_id),
            (attr::AWS_REGION, self.aws_region),
            (attr::AWS_PARTNER_EVENT_SOURCE, self.aws_partner_event_source),
            (attr::AZURE_SUBSCRIPTION_ID, self.azure_subscription_id),
            (attr::AZURE_RESOURCE_GROUP, self.azure_resource_group),
            (attr::AZURE_REGION, self.azure_region),
            (attr::AZURE_PARTNER_TOPIC, self.azure_partner_topic),
            (attr::HTTP_ENDPOINT, self.http_endpoint),
            (attr::HTTP_CONTENT_TYPE, self.http_content_type),
            (attr::HTTP_CONTENT_FORMAT, self.http_content_format),
            (attr::HTTP_AUTHORIZATION, self.http_authorization),
            (attr::DATADOG_REGION, self.datadog_region),
            (attr::DATADOG_API_KEY, self.datadog_api_key),
            (attr::SPLUNK_DOMAIN, self.splunk_domain),
            (attr::SPLUNK_TOKEN, self.splunk_token),
            (attr::SPLUNK_PORT, self.splunk_port),
        ];
        for (key, value) in strings {
            if let Some(v) = value {
                attributes.insert(key.to_string(), Value::String(v));
            }
        }

        if let Some(headers) = self.http_custom_headers {
            let items = headers.into_iter().map(Value::String).collect();
            attributes.insert(attr::HTTP_CUSTOM_HEADERS.to_string(), Value::List(items));
        }
        if let Some(secure) = self.splunk_secure {
            attributes.insert(attr::SPLUNK_SECURE.to_string(), Value::Bool(secure));
        }

        attributes
    }
}

struct AttributeReader<'a>(&'a HashMap<String, Value>);

impl AttributeReader<'_> {
    fn string(&self, key: &str) -> ProviderResult<Option<String>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(mismatch(key, "string", other)),
        }
    }

    fn required_string(&self, key: &str) -> ProviderResult<String> {
        self.string(key)?
            .ok_or_else(|| ProviderError::new(format!("Required attribute '{}' is missing", key)))
    }

    fn bool(&self, key: &str) -> ProviderResult<Option<bool>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(mismatch(key, "bool", other)),
        }
    }

    fn string_set(&self, key: &str) -> ProviderResult<Option<BTreeSet<String>>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(mismatch(key, "list of strings", other)),
                })
                .collect::<ProviderResult<BTreeSet<String>>>()
                .map(Some),
            Some(other) => Err(mismatch(key, "list of strings", other)),
        }
    }
}

fn mismatch(key: &str, expected: &str, got: &Value) -> ProviderError {
    // Values are not echoed, the attribute may be sensitive
    ProviderError::new(format!(
        "Attribute '{}' must be a {}, got {}",
        key,
        expected,
        got.type_name()
    ))
}
