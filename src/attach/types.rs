use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller's description of the volume to attach. Immutable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachRequest {
    /// logical volume / storage domain the disk lives in
    pub volume_id: String,
    /// target disk alias
    pub device: String,
    pub fs_type: String,
    /// `rw` or `ro`
    pub mode: String,
    /// provider-specific extra parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

impl AttachRequest {
    pub fn new(
        volume_id: impl Into<String>,
        device: impl Into<String>,
        fs_type: impl Into<String>,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            volume_id: volume_id.into(),
            device: device.into(),
            fs_type: fs_type.into(),
            mode: mode.into(),
            extra: None,
        }
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        let extra = extra.into();
        self.extra = (!extra.is_empty()).then_some(extra);
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.mode.trim().eq_ignore_ascii_case("ro")
    }
}

/// Outcome label derived from the response payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::Failure => "Failure",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized attach result, built fresh from each response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachResponse {
    pub id: String,
    pub bootable: bool,
    pub pass_discard: bool,
    pub interface: String,
    pub active: bool,
    /// `/dev/disk/by-id/virtio<id>`, empty unless status is Success
    pub device: String,
    pub status: Status,
    /// provider fault text when status is Failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
