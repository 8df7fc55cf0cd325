use crate::domain::model::{
    Action, Certificate, CertificateCreateOpts, LoadBalancer, ServiceUpdate,
};
use crate::utils::error::{ApiResult, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Reads renewed artifacts. Paths are relative to the storage root.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn lineage_path(&self) -> &Path;
    fn domains(&self) -> &[String];
    fn load_balancer_id(&self) -> i64;
    /// `None` selects the first HTTPS service of the load balancer.
    fn listen_port(&self) -> Option<u16>;
    fn poll_interval(&self) -> Duration;
    fn action_timeout(&self) -> Duration;
}

/// Control-plane operations used by the rotation.
///
/// Lookups return `Ok(None)` when the resource does not exist.
#[async_trait]
pub trait CloudApi: Send + Sync {
    async fn get_load_balancer(&self, id: i64) -> ApiResult<Option<LoadBalancer>>;
    async fn get_certificate(&self, id: i64) -> ApiResult<Option<Certificate>>;
    async fn create_certificate(&self, opts: &CertificateCreateOpts) -> ApiResult<Certificate>;
    /// Submits a full replacement of the service's certificate list and
    /// returns the action as reported by the submission response.
    async fn update_service(
        &self,
        load_balancer_id: i64,
        update: &ServiceUpdate,
    ) -> ApiResult<Action>;
    async fn get_action(&self, id: i64) -> ApiResult<Action>;
}
