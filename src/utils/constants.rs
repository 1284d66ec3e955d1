//! Shared constants and invariants

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_MS: u64 = 5_000;

// Engine endpoints. The token path hangs off the engine root (connection.url
// minus its trailing API_PATH_SUFFIX), the rest off connection.url itself.
pub const API_PATH_SUFFIX: &str = "/api";
pub const TOKEN_PATH: &str = "sso/oauth/token";
pub const VMS_PATH: &str = "vms";
pub const DISK_ATTACHMENTS_PATH: &str = "diskattachments";

pub const DEFAULT_SCOPE: &str = "ovirt-app-api";
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";
pub const GRANT_TYPE_PASSWORD: &str = "password";

pub const API_VERSION_HEADER: &str = "Version";
pub const API_VERSION: &str = "4";

pub const DEVICE_PREFIX: &str = "/dev/disk/by-id/virtio";
pub const DEFAULT_DISK_INTERFACE: &str = "virtio";
