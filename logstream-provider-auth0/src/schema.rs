//! Resource schema of `log_stream`

use logstream_core::provider::ResourceType;
use logstream_core::resource::Value;
use logstream_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use crate::log_stream::{LOG_STREAM_STATUSES, attr};
use crate::sink::{HTTP_CONTENT_FORMATS, LOG_STREAM_TYPES};

pub const LOG_STREAM: &str = "log_stream";

pub struct LogStreamType;

impl ResourceType for LogStreamType {
    fn name(&self) -> &'static str {
        LOG_STREAM
    }

    fn schema(&self) -> ResourceSchema {
        log_stream_schema()
    }
}

/// Stream type, matched case-insensitively
fn stream_type() -> AttributeType {
    AttributeType::Custom {
        name: "LogStreamType".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) if LOG_STREAM_TYPES.iter().any(|t| t.eq_ignore_ascii_case(s)) => {
                Ok(())
            }
            Value::String(s) => Err(format!(
                "expected type to be one of [{}], got {}",
                LOG_STREAM_TYPES.join(" "),
                s
            )),
            _ => Err("Expected string".to_string()),
        },
    }
}

fn enum_of(values: &[&str]) -> AttributeType {
    AttributeType::Enum(values.iter().map(|s| s.to_string()).collect())
}

fn string(name: &str) -> AttributeSchema {
    AttributeSchema::new(name, AttributeType::String)
}

pub fn log_stream_schema() -> ResourceSchema {
    use attr::*;

    ResourceSchema::new(LOG_STREAM)
        .with_description("Streams tenant logs to an external sink")
        .attribute(string(NAME).required())
        .attribute(
            AttributeSchema::new(TYPE, stream_type())
                .required()
                .force_new()
                .ignore_case()
                .with_description("Type of the LogStream, which indicates the Sink provider"),
        )
        .attribute(
            AttributeSchema::new(STATUS, enum_of(&LOG_STREAM_STATUSES))
                .computed()
                .with_description("Status of the LogStream"),
        )
        // eventbridge
        .attribute(
            string(AWS_ACCOUNT_ID)
                .sensitive()
                .force_new()
                .conflicts_with(&[
                    AZURE_SUBSCRIPTION_ID,
                    HTTP_ENDPOINT,
                    DATADOG_API_KEY,
                    SPLUNK_TOKEN,
                ])
                .required_with(&[AWS_REGION]),
        )
        .attribute(
            string(AWS_REGION)
                .sensitive()
                .force_new()
                .required_with(&[AWS_ACCOUNT_ID]),
        )
        .attribute(
            string(AWS_PARTNER_EVENT_SOURCE)
                .read_only()
                .with_description("Name of the Partner Event Source to be used with AWS"),
        )
        // eventgrid
        .attribute(
            string(AZURE_SUBSCRIPTION_ID)
                .sensitive()
                .force_new()
                .conflicts_with(&[AWS_ACCOUNT_ID, HTTP_ENDPOINT, DATADOG_API_KEY, SPLUNK_TOKEN])
                .required_with(&[AZURE_RESOURCE_GROUP, AZURE_REGION]),
        )
        .attribute(
            string(AZURE_RESOURCE_GROUP)
                .sensitive()
                .force_new()
                .conflicts_with(&[AWS_ACCOUNT_ID])
                .required_with(&[AZURE_SUBSCRIPTION_ID, AZURE_REGION]),
        )
        .attribute(
            string(AZURE_REGION)
                .sensitive()
                .force_new()
                .conflicts_with(&[AWS_ACCOUNT_ID])
                .required_with(&[AZURE_SUBSCRIPTION_ID, AZURE_RESOURCE_GROUP]),
        )
        .attribute(
            string(AZURE_PARTNER_TOPIC)
                .read_only()
                .with_description("Name of the Partner Topic to be used with Azure"),
        )
        // http
        .attribute(
            AttributeSchema::new(HTTP_CONTENT_FORMAT, enum_of(&HTTP_CONTENT_FORMATS))
                .required_with(&[HTTP_ENDPOINT, HTTP_AUTHORIZATION, HTTP_CONTENT_TYPE]),
        )
        .attribute(
            string(HTTP_CONTENT_TYPE)
                .with_description("HTTP Content Type")
                .required_with(&[HTTP_ENDPOINT, HTTP_AUTHORIZATION, HTTP_CONTENT_FORMAT]),
        )
        .attribute(
            string(HTTP_ENDPOINT)
                .with_description("HTTP endpoint")
                .required_with(&[HTTP_CONTENT_FORMAT, HTTP_AUTHORIZATION, HTTP_CONTENT_TYPE])
                .conflicts_with(&[
                    AWS_ACCOUNT_ID,
                    AZURE_SUBSCRIPTION_ID,
                    DATADOG_API_KEY,
                    SPLUNK_TOKEN,
                ]),
        )
        .attribute(
            string(HTTP_AUTHORIZATION)
                .sensitive()
                .required_with(&[HTTP_ENDPOINT, HTTP_CONTENT_FORMAT, HTTP_CONTENT_TYPE]),
        )
        .attribute(
            AttributeSchema::new(
                HTTP_CUSTOM_HEADERS,
                AttributeType::Set(Box::new(AttributeType::String)),
            )
            .with_description("custom HTTP headers")
            .conflicts_with(&[
                AWS_ACCOUNT_ID,
                AZURE_SUBSCRIPTION_ID,
                DATADOG_API_KEY,
                SPLUNK_TOKEN,
            ]),
        )
        // datadog
        .attribute(
            string(DATADOG_REGION)
                .required_with(&[DATADOG_API_KEY])
                .conflicts_with(&[AWS_ACCOUNT_ID, AZURE_SUBSCRIPTION_ID, HTTP_ENDPOINT, SPLUNK_TOKEN]),
        )
        .attribute(
            string(DATADOG_API_KEY)
                .sensitive()
                .force_new()
                .required_with(&[DATADOG_REGION]),
        )
        // splunk
        .attribute(string(SPLUNK_DOMAIN).required_with(&[SPLUNK_TOKEN, SPLUNK_PORT, SPLUNK_SECURE]))
        .attribute(
            string(SPLUNK_TOKEN)
                .sensitive()
                .required_with(&[SPLUNK_DOMAIN, SPLUNK_PORT, SPLUNK_SECURE])
                .conflicts_with(&[
                    AWS_ACCOUNT_ID,
                    AZURE_SUBSCRIPTION_ID,
                    HTTP_ENDPOINT,
                    DATADOG_API_KEY,
                ]),
        )
        .attribute(string(SPLUNK_PORT).required_with(&[SPLUNK_DOMAIN, SPLUNK_TOKEN, SPLUNK_SECURE]))
        .attribute(
            AttributeSchema::new(SPLUNK_SECURE, AttributeType::Bool).required_with(&[
                SPLUNK_DOMAIN,
                SPLUNK_PORT,
                SPLUNK_TOKEN,
            ]),
        )
}
