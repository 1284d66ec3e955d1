use http::header::{ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::attach::types::{AttachRequest, AttachResponse, Status};
use crate::cache::token::Token;
use crate::config::connection::Connection;
use crate::error::{ClientError, Result};
use crate::observability::metrics::get_metrics;
use crate::parser::lenient::{opt_bool_from_bool_or_string, opt_literal_from_number_or_string};
use crate::session::Session;
use crate::utils::constants::{
    API_VERSION, API_VERSION_HEADER, DEFAULT_DISK_INTERFACE, DEVICE_PREFIX, DISK_ATTACHMENTS_PATH, VMS_PATH,
};

const OPERATION: &str = "attach";

/// Wire body for the disk attachment call
#[derive(Debug, Serialize)]
struct DiskAttachmentBody<'a> {
    active: bool,
    bootable: bool,
    pass_discard: bool,
    interface: &'a str,
    read_only: bool,
    disk: DiskBody<'a>,
}

#[derive(Debug, Serialize)]
struct DiskBody<'a> {
    alias: &'a str,
    storage_domain: &'a str,
    fs_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> From<&'a AttachRequest> for DiskAttachmentBody<'a> {
    fn from(request: &'a AttachRequest) -> Self {
        Self {
            active: true,
            bootable: false,
            pass_discard: false,
            interface: DEFAULT_DISK_INTERFACE,
            read_only: request.is_read_only(),
            disk: DiskBody {
                alias: &request.device,
                storage_domain: &request.volume_id,
                fs_type: &request.fs_type,
                description: request.extra.as_deref(),
            },
        }
    }
}

/// Engine fault object, present on rejected or partially applied requests
#[derive(Debug, Deserialize)]
struct Fault {
    reason: Option<String>,
    detail: Option<String>,
}

impl Fault {
    fn message(&self) -> String {
        match (&self.reason, &self.detail) {
            (Some(reason), Some(detail)) => format!("{} {}", reason, detail),
            (Some(text), None) | (None, Some(text)) => text.to_owned(),
            (None, None) => "fault without reason".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DiskAttachmentResponse {
    #[serde(default, deserialize_with = "opt_literal_from_number_or_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "opt_bool_from_bool_or_string")]
    bootable: Option<bool>,
    #[serde(default, deserialize_with = "opt_bool_from_bool_or_string")]
    pass_discard: Option<bool>,
    interface: Option<String>,
    #[serde(default, deserialize_with = "opt_bool_from_bool_or_string")]
    active: Option<bool>,
    fault: Option<Fault>,
    error: Option<Value>,
}

impl Session {
    /// Attach the requested volume to `host_id`, authenticating first when needed.
    pub async fn attach(&self, request: &AttachRequest, host_id: &str) -> Result<AttachResponse> {
        let metrics = get_metrics();
        let result = self.send_attach(request, host_id).await;

        match &result {
            Ok(response) => {
                metrics.attach_requests.with_label_values(&[response.status.as_str()]).inc();
                info!(
                    host = host_id,
                    volume = %request.volume_id,
                    disk_id = %response.id,
                    status = %response.status,
                    "attach finished"
                );
            }
            Err(e) => {
                metrics.attach_failures.with_label_values(&[e.kind()]).inc();
                error!(host = host_id, volume = %request.volume_id, error = %e, "attach failed");
            }
        }
        result
    }

    async fn send_attach(&self, request: &AttachRequest, host_id: &str) -> Result<AttachResponse> {
        if host_id.trim().is_empty() {
            return Err(ClientError::Attach("host id must not be empty".to_string()));
        }

        let token = self.valid_token().await?;
        let url = attachments_url(self.connection(), host_id)?;

        let start = Instant::now();
        let exchanged = self.post_attachment(url, &token, request).await;
        get_metrics()
            .request_duration
            .with_label_values(&[OPERATION])
            .observe(start.elapsed().as_secs_f64());
        let (status, body) = exchanged?;

        if !status.is_success() {
            let detail = serde_json::from_str::<DiskAttachmentResponse>(&body)
                .ok()
                .and_then(|r| r.fault)
                .map(|f| f.message())
                .unwrap_or(body);
            return Err(ClientError::Attach(format!("HTTP {}: {}", status, detail)));
        }

        parse_attach_response(&body)
    }

    /// Send the attachment body and read the reply, transport errors only
    async fn post_attachment(&self, url: Url, token: &Token, request: &AttachRequest) -> Result<(StatusCode, String)> {
        let response = self
            .client()
            .post(url)
            .header(AUTHORIZATION, token.authorization())
            .header(ACCEPT, "application/json")
            .header(API_VERSION_HEADER, API_VERSION)
            .json(&DiskAttachmentBody::from(request))
            .send()
            .await
            .map_err(|e| ClientError::transport(OPERATION, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::transport(OPERATION, e))?;
        Ok((status, body))
    }
}

/// `<url>/vms/<host_id>/diskattachments` with the host id escaped as one path segment
fn attachments_url(connection: &Connection, host_id: &str) -> Result<Url> {
    let mut url = Url::parse(&connection.endpoint(VMS_PATH))
        .map_err(|e| ClientError::Config(format!("invalid connection.url '{}': {}", connection.url, e)))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::Config(format!("connection.url '{}' cannot carry a path", connection.url)))?
        .push(host_id)
        .push(DISK_ATTACHMENTS_PATH);
    Ok(url)
}

/// Map an attach response body onto [`AttachResponse`].
///
/// The device path is the fixed prefix plus the id literal as received;
/// non-numeric ids are not validated.
pub fn parse_attach_response(body: &str) -> Result<AttachResponse> {
    let parsed: DiskAttachmentResponse = serde_json::from_str(body)
        .map_err(|e| ClientError::Attach(format!("invalid attach response body: {}", e)))?;

    let id = parsed.id.map(|id| id.trim().to_owned()).unwrap_or_default();
    let fault = parsed
        .fault
        .map(|f| f.message())
        .or_else(|| parsed.error.map(|e| error_text(&e)));

    let usable = !id.is_empty() && !is_zero_id(&id) && fault.is_none();
    let (status, device, message) = if usable {
        (Status::Success, format!("{}{}", DEVICE_PREFIX, id), None)
    } else {
        let message = fault.unwrap_or_else(|| "response carries no disk id".to_string());
        warn!(disk_id = %id, reason = %message, "attach response is not a usable disk record");
        (Status::Failure, String::new(), Some(message))
    };

    Ok(AttachResponse {
        id,
        bootable: parsed.bootable.unwrap_or(false),
        pass_discard: parsed.pass_discard.unwrap_or(false),
        interface: parsed.interface.unwrap_or_default(),
        active: parsed.active.unwrap_or(false),
        device,
        status,
        message,
    })
}

fn is_zero_id(id: &str) -> bool {
    id.chars().all(|c| c == '0')
}

fn error_text(error: &Value) -> String {
    match error {
        Value::String(s) => s.to_owned(),
        other => other.to_string(),
    }
}
