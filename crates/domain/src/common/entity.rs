use serde::{Deserialize, Serialize};

/// Tenant identifier as carried on job payloads and storage keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index-store document id of a finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FindingId(pub String);

impl std::fmt::Display for FindingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-readable ticket key assigned by the tracker (e.g. "SEC-42").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketKey(pub String);

impl std::fmt::Display for TicketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Vendor scanning tool that produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolType {
    CodeScanning,
    Dependabot,
    SecretScanning,
}

impl ToolType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CodeScanning => "CODE_SCANNING",
            Self::Dependabot => "DEPENDABOT",
            Self::SecretScanning => "SECRET_SCANNING",
        }
    }

    /// URL path segment of the vendor alert API for this tool.
    pub fn api_segment(self) -> &'static str {
        match self {
            Self::CodeScanning => "code-scanning",
            Self::Dependabot => "dependabot",
            Self::SecretScanning => "secret-scanning",
        }
    }
}

impl std::fmt::Display for ToolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ToolType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CODE_SCANNING" => Ok(Self::CodeScanning),
            "DEPENDABOT" => Ok(Self::Dependabot),
            "SECRET_SCANNING" => Ok(Self::SecretScanning),
            _ => Err(format!(
                "unknown tool type '{s}': expected CODE_SCANNING|DEPENDABOT|SECRET_SCANNING"
            )),
        }
    }
}

/// Severity of a finding as recorded in the index store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tenant coordinates and credentials for the three external systems.
///
/// Owned by an external configuration store; read-only from the engine's
/// perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    /// Vendor alert API credential (personal access token).
    pub access_token: String,
    pub owner: String,
    pub repo: String,
    /// Name of the index holding the canonical finding records.
    pub index: String,
    /// Tracker host, e.g. "acme.atlassian.net".
    pub tracker_site: String,
    pub project_key: String,
    pub tracker_user: String,
    pub tracker_token: String,
}
