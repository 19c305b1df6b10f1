//! Mock port implementations shared by the service tests.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use domain::common::entity::{FindingId, Severity, Tenant, TenantId, TicketKey, ToolType};
use domain::common::error::DomainError;
use domain::finding::entity::{CanonicalState, Finding};
use domain::finding::error::IndexError;
use domain::job::entity::Acknowledgement;
use domain::runbook::config::RunbookConfig;
use domain::runbook::entity::Runbook;
use domain::runbook::error::RunbookError;
use domain::ticket::entity::{TicketLink, Transition};
use domain::ticket::error::TicketError;
use ports::secondary::ack_sink::AckSink;
use ports::secondary::finding_index::FindingIndex;
use ports::secondary::runbook_store::RunbookStore;
use ports::secondary::tenant_store::TenantStore;
use ports::secondary::ticket_link_store::TicketLinkStore;
use ports::secondary::ticket_tracker::TicketTrackerApi;
use ports::secondary::vendor_alert::VendorAlertApi;

pub fn make_tenant(id: &str) -> Tenant {
    Tenant {
        id: TenantId(id.to_string()),
        access_token: "gh-token".to_string(),
        owner: "acme".to_string(),
        repo: "shop".to_string(),
        index: "findings-acme".to_string(),
        tracker_site: "acme.atlassian.net".to_string(),
        project_key: "SEC".to_string(),
        tracker_user: "bot@acme.example".to_string(),
        tracker_token: "jira-token".to_string(),
    }
}

pub fn make_finding(id: &str, alert_number: &str, state: CanonicalState) -> Finding {
    Finding {
        id: FindingId(id.to_string()),
        alert_number: alert_number.to_string(),
        tool_type: ToolType::CodeScanning,
        title: format!("finding {id}"),
        description: format!("description of {id}"),
        state,
        severity: Severity::High,
        ticket_id: None,
    }
}

pub fn transition(id: &str, name: &str) -> Transition {
    Transition {
        id: id.to_string(),
        name: name.to_string(),
    }
}

// ── Tenant store ───────────────────────────────────────────────────

pub struct MockTenantStore {
    tenants: Vec<Tenant>,
}

impl MockTenantStore {
    pub fn with(tenants: Vec<Tenant>) -> Self {
        Self { tenants }
    }

    pub fn empty() -> Self {
        Self { tenants: vec![] }
    }
}

impl TenantStore for MockTenantStore {
    fn find_by_id(&self, id: &TenantId) -> Result<Option<Tenant>, DomainError> {
        Ok(self.tenants.iter().find(|t| &t.id == id).cloned())
    }
}

// ── Vendor alert API ───────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct VendorCall {
    pub tool: ToolType,
    pub alert_number: u64,
    pub requested_state: String,
    pub mapped_reason: Option<String>,
}

pub struct MockVendor {
    calls: Mutex<Vec<VendorCall>>,
    succeed: AtomicBool,
}

impl MockVendor {
    pub fn succeeding() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            succeed: AtomicBool::new(true),
        }
    }

    pub fn failing() -> Self {
        let vendor = Self::succeeding();
        vendor.succeed.store(false, Ordering::SeqCst);
        vendor
    }

    pub fn calls(&self) -> Vec<VendorCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl VendorAlertApi for MockVendor {
    fn set_alert_state<'a>(
        &'a self,
        _credential: &'a str,
        _owner: &'a str,
        _repo: &'a str,
        tool_type: ToolType,
        alert_number: u64,
        requested_state: &'a str,
        mapped_reason: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        self.calls.lock().unwrap().push(VendorCall {
            tool: tool_type,
            alert_number,
            requested_state: requested_state.to_string(),
            mapped_reason: mapped_reason.map(str::to_string),
        });
        let ok = self.succeed.load(Ordering::SeqCst);
        Box::pin(async move { ok })
    }
}

// ── Ticket tracker ─────────────────────────────────────────────────

pub struct MockTracker {
    create_key: Option<String>,
    /// Successive responses to `list_transitions`; when exhausted, either
    /// the `repeat` list (forever) or empty (terminal).
    chain: Mutex<VecDeque<Vec<Transition>>>,
    repeat: Option<Vec<Transition>>,
    applied: Mutex<Vec<String>>,
}

impl MockTracker {
    pub fn with_chain(chain: Vec<Vec<Transition>>) -> Self {
        Self {
            create_key: Some("SEC-1".to_string()),
            chain: Mutex::new(chain.into()),
            repeat: None,
            applied: Mutex::new(Vec::new()),
        }
    }

    /// Tracker that always reports the same legal transitions — a workflow
    /// that never terminates on its own.
    pub fn looping(transitions: Vec<Transition>) -> Self {
        Self {
            create_key: Some("SEC-1".to_string()),
            chain: Mutex::new(VecDeque::new()),
            repeat: Some(transitions),
            applied: Mutex::new(Vec::new()),
        }
    }

    pub fn creating(key: &str) -> Self {
        Self {
            create_key: Some(key.to_string()),
            chain: Mutex::new(VecDeque::new()),
            repeat: None,
            applied: Mutex::new(Vec::new()),
        }
    }

    /// Tracker whose create response carries no key.
    pub fn creating_without_key() -> Self {
        Self {
            create_key: None,
            chain: Mutex::new(VecDeque::new()),
            repeat: None,
            applied: Mutex::new(Vec::new()),
        }
    }

    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().unwrap().clone()
    }
}

impl TicketTrackerApi for MockTracker {
    fn create_issue<'a>(
        &'a self,
        _tenant: &'a Tenant,
        _summary: &'a str,
        _description: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TicketKey, TicketError>> + Send + 'a>> {
        let result = match &self.create_key {
            Some(key) => Ok(TicketKey(key.clone())),
            None => Err(TicketError::MissingKey),
        };
        Box::pin(async move { result })
    }

    fn list_transitions<'a>(
        &'a self,
        _tenant: &'a Tenant,
        _ticket_key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Transition>, TicketError>> + Send + 'a>> {
        let next = self
            .chain
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.repeat.clone())
            .unwrap_or_default();
        Box::pin(async move { Ok(next) })
    }

    fn apply_transition<'a>(
        &'a self,
        _tenant: &'a Tenant,
        _ticket_key: &'a str,
        transition_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), TicketError>> + Send + 'a>> {
        self.applied.lock().unwrap().push(transition_id.to_string());
        Box::pin(async move { Ok(()) })
    }
}

// ── Finding index ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockIndex {
    findings: Mutex<Vec<Finding>>,
    doc_id: Mutex<Option<FindingId>>,
    state_updates: Mutex<Vec<(u64, CanonicalState)>>,
    ticket_sets: Mutex<Vec<(String, String)>>,
}

impl MockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_findings(findings: Vec<Finding>) -> Self {
        let index = Self::default();
        *index.findings.lock().unwrap() = findings;
        index
    }

    pub fn with_doc_id(self, id: &str) -> Self {
        *self.doc_id.lock().unwrap() = Some(FindingId(id.to_string()));
        self
    }

    pub fn state_updates(&self) -> Vec<(u64, CanonicalState)> {
        self.state_updates.lock().unwrap().clone()
    }

    pub fn ticket_sets(&self) -> Vec<(String, String)> {
        self.ticket_sets.lock().unwrap().clone()
    }
}

impl FindingIndex for MockIndex {
    fn update_state<'a>(
        &'a self,
        _index: &'a str,
        alert_number: u64,
        state: CanonicalState,
    ) -> Pin<Box<dyn Future<Output = Result<(), IndexError>> + Send + 'a>> {
        self.state_updates.lock().unwrap().push((alert_number, state));
        Box::pin(async { Ok(()) })
    }

    fn find_doc_id<'a>(
        &'a self,
        _index: &'a str,
        _alert_number: u64,
        _tool_type: ToolType,
    ) -> Pin<Box<dyn Future<Output = Result<Option<FindingId>, IndexError>> + Send + 'a>> {
        let id = self.doc_id.lock().unwrap().clone();
        Box::pin(async move { Ok(id) })
    }

    fn fetch_by_ids<'a>(
        &'a self,
        _index: &'a str,
        ids: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Finding>, IndexError>> + Send + 'a>> {
        let found: Vec<Finding> = self
            .findings
            .lock()
            .unwrap()
            .iter()
            .filter(|f| ids.contains(&f.id.0))
            .cloned()
            .collect();
        Box::pin(async move { Ok(found) })
    }

    fn set_ticket_id<'a>(
        &'a self,
        _index: &'a str,
        finding_id: &'a FindingId,
        ticket_key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), IndexError>> + Send + 'a>> {
        self.ticket_sets
            .lock()
            .unwrap()
            .push((finding_id.0.clone(), ticket_key.to_string()));
        Box::pin(async { Ok(()) })
    }
}

// ── Ticket link store ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockLinkStore {
    links: Mutex<HashMap<String, TicketLink>>,
}

impl MockLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_link(self, link: TicketLink) -> Self {
        self.links
            .lock()
            .unwrap()
            .insert(link.finding_id.0.clone(), link);
        self
    }

    pub fn saved(&self) -> Vec<TicketLink> {
        self.links.lock().unwrap().values().cloned().collect()
    }
}

impl TicketLinkStore for MockLinkStore {
    fn find_by_finding_id(
        &self,
        finding_id: &FindingId,
    ) -> Result<Option<TicketLink>, DomainError> {
        Ok(self.links.lock().unwrap().get(&finding_id.0).cloned())
    }

    fn save(&self, link: &TicketLink) -> Result<(), DomainError> {
        self.links
            .lock()
            .unwrap()
            .insert(link.finding_id.0.clone(), link.clone());
        Ok(())
    }
}

// ── Runbook store ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockRunbookStore {
    runbooks: Vec<Runbook>,
    configs: HashMap<String, RunbookConfig>,
    malformed: Vec<String>,
}

impl MockRunbookStore {
    pub fn with(runbooks: Vec<Runbook>, configs: Vec<RunbookConfig>) -> Self {
        Self {
            runbooks,
            configs: configs
                .into_iter()
                .map(|c| (c.runbook_id.clone(), c))
                .collect(),
            malformed: Vec::new(),
        }
    }

    /// Mark a runbook id as having an unparsable config blob.
    pub fn with_malformed(mut self, runbook_id: &str) -> Self {
        self.malformed.push(runbook_id.to_string());
        self
    }
}

impl RunbookStore for MockRunbookStore {
    fn runbooks_for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<Runbook>, RunbookError> {
        Ok(self
            .runbooks
            .iter()
            .filter(|rb| &rb.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    fn config_for_runbook(&self, runbook_id: &str) -> Result<Option<RunbookConfig>, RunbookError> {
        if self.malformed.iter().any(|id| id == runbook_id) {
            return Err(RunbookError::MalformedConfig {
                runbook_id: runbook_id.to_string(),
                message: "unparsable blob".to_string(),
            });
        }
        Ok(self.configs.get(runbook_id).cloned())
    }
}

// ── Ack sink ───────────────────────────────────────────────────────

pub struct MockAckSink {
    emitted: Mutex<Vec<Acknowledgement>>,
    fail: bool,
}

impl MockAckSink {
    pub fn new() -> Self {
        Self {
            emitted: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            emitted: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn emitted(&self) -> Vec<Acknowledgement> {
        self.emitted.lock().unwrap().clone()
    }
}

impl AckSink for MockAckSink {
    fn emit<'a>(
        &'a self,
        ack: &'a Acknowledgement,
    ) -> Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send + 'a>> {
        if self.fail {
            return Box::pin(async { Err(DomainError::EngineError("sink down".to_string())) });
        }
        self.emitted.lock().unwrap().push(ack.clone());
        Box::pin(async { Ok(()) })
    }
}
