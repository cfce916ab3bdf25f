//! Sink payloads of the Management API
//!
//! The API encodes every sink as one flat object without a tag of its own;
//! the owning log stream's `type` decides which shape it has.

use serde::{Deserialize, Serialize};

pub const TYPE_EVENTBRIDGE: &str = "eventbridge";
pub const TYPE_EVENTGRID: &str = "eventgrid";
pub const TYPE_HTTP: &str = "http";
pub const TYPE_DATADOG: &str = "datadog";
pub const TYPE_SPLUNK: &str = "splunk";

/// Every log stream type the provider knows how to map
pub const LOG_STREAM_TYPES: [&str; 5] = [
    TYPE_EVENTBRIDGE,
    TYPE_EVENTGRID,
    TYPE_HTTP,
    TYPE_DATADOG,
    TYPE_SPLUNK,
];

pub const HTTP_CONTENT_FORMATS: [&str; 2] = ["JSONLINES", "JSONARRAY"];

/// Amazon EventBridge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBridgeSink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,
    /// Assigned by Auth0 once the stream exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_partner_event_source: Option<String>,
}

/// Azure Event Grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGridSink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure_subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure_resource_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure_region: Option<String>,
    /// Assigned by Auth0 once the stream exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure_partner_topic: Option<String>,
}

/// Generic HTTP webhook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpSink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_content_type: Option<String>,
    /// JSONLINES or JSONARRAY
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_content_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_authorization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_custom_headers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatadogSink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datadog_region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datadog_api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplunkSink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splunk_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splunk_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splunk_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splunk_secure: Option<bool>,
}

/// Destination of a log stream
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Sink {
    EventBridge(EventBridgeSink),
    EventGrid(EventGridSink),
    Http(HttpSink),
    Datadog(DatadogSink),
    Splunk(SplunkSink),
    /// Sink of a stream type this provider does not map, kept verbatim
    Other(serde_json::Map<String, serde_json::Value>),
}

impl Sink {
    /// Decode a raw sink object according to the owning stream's type
    pub fn decode(
        stream_type: Option<&str>,
        raw: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let sink = match stream_type {
            Some(TYPE_EVENTBRIDGE) => Sink::EventBridge(serde_json::from_value(raw)?),
            Some(TYPE_EVENTGRID) => Sink::EventGrid(serde_json::from_value(raw)?),
            Some(TYPE_HTTP) => Sink::Http(serde_json::from_value(raw)?),
            Some(TYPE_DATADOG) => Sink::Datadog(serde_json::from_value(raw)?),
            Some(TYPE_SPLUNK) => Sink::Splunk(serde_json::from_value(raw)?),
            _ => Sink::Other(serde_json::from_value(raw)?),
        };
        Ok(sink)
    }

    /// Stream type tag matching this sink's shape
    pub fn stream_type(&self) -> Option<&'static str> {
        match self {
            Sink::EventBridge(_) => Some(TYPE_EVENTBRIDGE),
            Sink::EventGrid(_) => Some(TYPE_EVENTGRID),
            Sink::Http(_) => Some(TYPE_HTTP),
            Sink::Datadog(_) => Some(TYPE_DATADOG),
            Sink::Splunk(_) => Some(TYPE_SPLUNK),
            Sink::Other(_) => None,
        }
    }

    /// Drop fields that only the remote side may assign
    pub fn without_read_only(self) -> Self {
        match self {
            Sink::EventBridge(s) => Sink::EventBridge(EventBridgeSink {
                aws_partner_event_source: None,
                ..s
            }),
            Sink::EventGrid(s) => Sink::EventGrid(EventGridSink {
                azure_partner_topic: None,
                ..s
            }),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_selects_variant_by_type() {
        let raw = json!({
            "splunkDomain": "demo.splunk.com",
            "splunkToken": "12a34ab5-c6d7-8901-23ef-456b7c89d012",
            "splunkPort": "8088",
            "splunkSecure": true
        });

        let sink = Sink::decode(Some(TYPE_SPLUNK), raw).unwrap();
        assert_eq!(
            sink,
            Sink::Splunk(SplunkSink {
                splunk_domain: Some("demo.splunk.com".to_string()),
                splunk_token: Some("12a34ab5-c6d7-8901-23ef-456b7c89d012".to_string()),
                splunk_port: Some("8088".to_string()),
                splunk_secure: Some(true),
            })
        );
    }

    #[test]
    fn decode_unknown_type_keeps_raw_object() {
        let raw = json!({"mixpanelRegion": "us"});
        let sink = Sink::decode(Some("mixpanel"), raw).unwrap();
        match &sink {
            Sink::Other(map) => assert_eq!(map["mixpanelRegion"], json!("us")),
            other => panic!("Expected Other, got {:?}", other),
        }
        assert_eq!(sink.stream_type(), None);
    }

    #[test]
    fn encode_is_flat_and_omits_absent_fields() {
        let sink = Sink::Datadog(DatadogSink {
            datadog_region: Some("us".to_string()),
            datadog_api_key: None,
        });
        assert_eq!(
            serde_json::to_value(&sink).unwrap(),
            json!({"datadogRegion": "us"})
        );
    }

    #[test]
    fn without_read_only_clears_partner_fields() {
        let sink = Sink::EventBridge(EventBridgeSink {
            aws_account_id: Some("999999999999".to_string()),
            aws_region: Some("us-west-2".to_string()),
            aws_partner_event_source: Some("aws.partner/auth0.com/x".to_string()),
        });

        match sink.without_read_only() {
            Sink::EventBridge(s) => {
                assert_eq!(s.aws_account_id.as_deref(), Some("999999999999"));
                assert!(s.aws_partner_event_source.is_none());
            }
            other => panic!("Expected EventBridge, got {:?}", other),
        }
    }
}
