//! In-memory control plane used by the core unit tests.

use crate::core::{CloudApi, ConfigProvider};
use crate::domain::model::{
    Action, ActionError, ActionStatus, Certificate, CertificateCreateOpts, CertificateRef,
    LoadBalancer, Service, ServiceProtocol, ServiceUpdate,
};
use crate::utils::error::{ApiError, ApiResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct State {
    load_balancers: HashMap<i64, LoadBalancer>,
    certificates: HashMap<i64, Certificate>,
    actions: HashMap<i64, Action>,
    next_id: i64,
    calls: Vec<String>,
    updates: Vec<ServiceUpdate>,
    failing_update: Option<usize>,
    rejected_update: Option<usize>,
    fail_create: bool,
    broken_certificate: Option<i64>,
    stalled: bool,
}

pub struct FakeCloud {
    state: Mutex<State>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1000,
                ..State::default()
            }),
        }
    }

    pub fn with_load_balancer(self, lb: LoadBalancer) -> Self {
        self.state.lock().unwrap().load_balancers.insert(lb.id, lb);
        self
    }

    pub fn with_certificate(self, cert: Certificate) -> Self {
        self.state.lock().unwrap().certificates.insert(cert.id, cert);
        self
    }

    /// The n-th (1-based) update_service call finishes with an error action.
    pub fn fail_update(self, n: usize) -> Self {
        self.state.lock().unwrap().failing_update = Some(n);
        self
    }

    /// The n-th (1-based) update_service call is rejected outright.
    pub fn reject_update(self, n: usize) -> Self {
        self.state.lock().unwrap().rejected_update = Some(n);
        self
    }

    pub fn fail_create(self) -> Self {
        self.state.lock().unwrap().fail_create = true;
        self
    }

    pub fn break_certificate_lookup(self, id: i64) -> Self {
        self.state.lock().unwrap().broken_certificate = Some(id);
        self
    }

    /// Actions never leave the running state.
    pub fn stall_actions(self) -> Self {
        self.state.lock().unwrap().stalled = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn updates(&self) -> Vec<ServiceUpdate> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn bound_ids(&self, lb_id: i64, listen_port: u16) -> Vec<i64> {
        let state = self.state.lock().unwrap();
        state.load_balancers[&lb_id]
            .services
            .iter()
            .find(|s| s.listen_port == listen_port)
            .map(|s| s.certificates.iter().map(|c| c.id).collect())
            .unwrap_or_default()
    }

    pub fn certificate_count(&self) -> usize {
        self.state.lock().unwrap().certificates.len()
    }
}

#[async_trait]
impl CloudApi for FakeCloud {
    async fn get_load_balancer(&self, id: i64) -> ApiResult<Option<LoadBalancer>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get_load_balancer:{}", id));
        Ok(state.load_balancers.get(&id).cloned())
    }

    async fn get_certificate(&self, id: i64) -> ApiResult<Option<Certificate>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get_certificate:{}", id));
        if state.broken_certificate == Some(id) {
            return Err(remote_error(500, "server_error"));
        }
        Ok(state.certificates.get(&id).cloned())
    }

    async fn create_certificate(&self, opts: &CertificateCreateOpts) -> ApiResult<Certificate> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create_certificate:{}", opts.name));
        if state.fail_create {
            return Err(remote_error(422, "invalid_input"));
        }
        state.next_id += 1;
        let cert = Certificate {
            id: state.next_id,
            name: opts.name.clone(),
            domain_names: opts.domain_names.clone(),
            labels: opts.labels.clone(),
            fingerprint: None,
            not_valid_after: None,
        };
        state.certificates.insert(cert.id, cert.clone());
        Ok(cert)
    }

    async fn update_service(
        &self,
        load_balancer_id: i64,
        update: &ServiceUpdate,
    ) -> ApiResult<Action> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("update_service:{}", update.listen_port));
        state.updates.push(update.clone());
        let call = state.updates.len();

        if state.rejected_update == Some(call) {
            return Err(remote_error(409, "conflict"));
        }

        state.next_id += 1;
        let id = state.next_id;
        let failed = state.failing_update == Some(call);
        let finished = Action {
            id,
            command: "update_service".to_string(),
            status: if failed {
                ActionStatus::Error
            } else {
                ActionStatus::Success
            },
            progress: 100,
            error: failed.then(|| ActionError {
                code: "action_failed".to_string(),
                message: "update failed".to_string(),
            }),
        };
        state.actions.insert(id, finished);

        if !failed {
            if let Some(service) = state
                .load_balancers
                .get_mut(&load_balancer_id)
                .and_then(|lb| lb.services.iter_mut().find(|s| s.listen_port == update.listen_port))
            {
                service.certificates = update.certificates.clone();
            }
        }

        Ok(Action {
            id,
            command: "update_service".to_string(),
            status: ActionStatus::Running,
            progress: 0,
            error: None,
        })
    }

    async fn get_action(&self, id: i64) -> ApiResult<Action> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get_action:{}", id));
        let mut action = state
            .actions
            .get(&id)
            .cloned()
            .ok_or_else(|| remote_error(404, "not_found"))?;
        if state.stalled {
            action.status = ActionStatus::Running;
            action.progress = 50;
        }
        Ok(action)
    }
}

fn remote_error(status: u16, code: &str) -> ApiError {
    ApiError::RemoteError {
        status,
        code: code.to_string(),
        message: format!("fake {}", code),
    }
}

pub fn certificate(id: i64, domains: &[&str]) -> Certificate {
    Certificate {
        id,
        name: format!("cert-{}", id),
        domain_names: domains.iter().map(|d| d.to_string()).collect(),
        labels: HashMap::new(),
        fingerprint: None,
        not_valid_after: None,
    }
}

pub fn service(listen_port: u16, protocol: ServiceProtocol, bound: &[i64]) -> Service {
    Service {
        listen_port,
        destination_port: 80,
        protocol,
        certificates: bound.iter().map(|&id| CertificateRef { id }).collect(),
    }
}

pub fn load_balancer(id: i64, services: Vec<Service>) -> LoadBalancer {
    LoadBalancer {
        id,
        name: format!("lb-{}", id),
        services,
    }
}

pub fn domains(list: &[&str]) -> Vec<String> {
    list.iter().map(|d| d.to_string()).collect()
}

pub struct MockConfig {
    pub lineage_path: PathBuf,
    pub domains: Vec<String>,
    pub load_balancer_id: i64,
    pub listen_port: Option<u16>,
    pub action_timeout: Duration,
}

impl MockConfig {
    pub fn new(load_balancer_id: i64, domains: &[&str]) -> Self {
        Self {
            lineage_path: PathBuf::from("/etc/letsencrypt/live/example.com"),
            domains: self::domains(domains),
            load_balancer_id,
            listen_port: None,
            action_timeout: Duration::from_secs(5),
        }
    }
}

impl ConfigProvider for MockConfig {
    fn lineage_path(&self) -> &Path {
        &self.lineage_path
    }

    fn domains(&self) -> &[String] {
        &self.domains
    }

    fn load_balancer_id(&self) -> i64 {
        self.load_balancer_id
    }

    fn listen_port(&self) -> Option<u16> {
        self.listen_port
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(1)
    }

    fn action_timeout(&self) -> Duration {
        self.action_timeout
    }
}
