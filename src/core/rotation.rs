use crate::core::action::apply_service_update;
use crate::core::inspector::{inspect, Inspection};
use crate::core::publisher::publish;
use crate::core::{CloudApi, ConfigProvider, Storage};
use crate::domain::model::{
    Certificate, CertificateRef, RenewalRequest, ServiceUpdate, FULL_CHAIN_FILE,
    PRIVATE_KEY_FILE,
};
use crate::utils::error::{Result, RotationError};
use chrono::{DateTime, Utc};

/// Where the rotation stopped on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    /// New certificate bound; there was no old certificate to retire.
    Attached,
    /// New certificate bound and the old one removed from the service.
    Detached,
}

#[derive(Debug, Clone)]
pub struct RotationOutcome {
    pub state: RotationState,
    pub load_balancer_id: i64,
    pub listen_port: u16,
    pub new_certificate: Certificate,
    /// Unbound from the service but not deleted.
    pub retired_certificate: Option<Certificate>,
    /// The service's certificate list after the last applied phase.
    pub certificates: Vec<CertificateRef>,
}

/// Existing bindings in order, followed by the new certificate.
pub fn with_attached(current: &[CertificateRef], new_cert: &Certificate) -> Vec<CertificateRef> {
    let mut certificates = Vec::with_capacity(current.len() + 1);
    certificates.extend_from_slice(current);
    certificates.push(CertificateRef::from(new_cert));
    certificates
}

pub fn without(current: &[CertificateRef], old_id: i64) -> Vec<CertificateRef> {
    current.iter().copied().filter(|c| c.id != old_id).collect()
}

/// Rotates one certificate on one HTTPS service in two verified phases.
///
/// Phase 1 binds the new certificate next to the existing ones. Phase 2 runs
/// only when a certificate with the same domain set was bound before, and
/// removes it. A failed phase 2 leaves both certificates serving; it is never
/// rolled back.
pub struct RotationEngine<A: CloudApi, S: Storage, C: ConfigProvider> {
    api: A,
    storage: S,
    config: C,
}

impl<A: CloudApi, S: Storage, C: ConfigProvider> RotationEngine<A, S, C> {
    pub fn new(api: A, storage: S, config: C) -> Self {
        Self {
            api,
            storage,
            config,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// 讀取續期後的憑證與私鑰；任何網路呼叫前執行
    pub async fn load_request(&self) -> Result<RenewalRequest> {
        let full_chain_pem = self.read_pem(FULL_CHAIN_FILE).await?;
        let private_key_pem = self.read_pem(PRIVATE_KEY_FILE).await?;

        Ok(RenewalRequest {
            lineage_path: self.config.lineage_path().to_path_buf(),
            domains: self.config.domains().to_vec(),
            full_chain_pem,
            private_key_pem,
        })
    }

    async fn read_pem(&self, file: &str) -> Result<String> {
        let bytes = self.storage.read_file(file).await?;
        String::from_utf8(bytes).map_err(|_| RotationError::ArtifactEncodingError {
            path: self.config.lineage_path().join(file),
        })
    }

    pub async fn run(&self) -> Result<RotationOutcome> {
        self.run_at(Utc::now()).await
    }

    /// `now` determines the uploaded certificate's name.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RotationOutcome> {
        let request = self.load_request().await?;
        tracing::info!(
            lineage = %request.lineage_path.display(),
            domains = ?request.domains,
            "🚀 Starting certificate rotation"
        );

        let inspection = inspect(
            &self.api,
            self.config.load_balancer_id(),
            self.config.listen_port(),
            &request.domains,
        )
        .await?;

        let new_certificate = publish(&self.api, &request, now).await?;

        let attached = self.attach(&inspection, &new_certificate).await?;

        let Some(old_certificate) = inspection.old_certificate.clone() else {
            return Ok(RotationOutcome {
                state: RotationState::Attached,
                load_balancer_id: inspection.load_balancer_id,
                listen_port: inspection.service.listen_port,
                new_certificate,
                retired_certificate: None,
                certificates: attached,
            });
        };

        let remaining = self.detach(&inspection, &attached, &old_certificate).await?;

        Ok(RotationOutcome {
            state: RotationState::Detached,
            load_balancer_id: inspection.load_balancer_id,
            listen_port: inspection.service.listen_port,
            new_certificate,
            retired_certificate: Some(old_certificate),
            certificates: remaining,
        })
    }

    async fn attach(
        &self,
        inspection: &Inspection,
        new_certificate: &Certificate,
    ) -> Result<Vec<CertificateRef>> {
        let certificates = with_attached(&inspection.service.certificates, new_certificate);
        let update = ServiceUpdate::for_service(&inspection.service, certificates);

        let action = apply_service_update(
            &self.api,
            inspection.load_balancer_id,
            &update,
            self.config.poll_interval(),
            self.config.action_timeout(),
        )
        .await
        .map_err(|source| RotationError::AttachError {
            listen_port: update.listen_port,
            certificate_id: new_certificate.id,
            source,
        })?;

        tracing::info!(
            load_balancer_id = inspection.load_balancer_id,
            listen_port = update.listen_port,
            certificate_id = new_certificate.id,
            action_id = action.id,
            "🔗 Attached new certificate"
        );
        Ok(update.certificates)
    }

    async fn detach(
        &self,
        inspection: &Inspection,
        attached: &[CertificateRef],
        old_certificate: &Certificate,
    ) -> Result<Vec<CertificateRef>> {
        let certificates = without(attached, old_certificate.id);
        let update = ServiceUpdate::for_service(&inspection.service, certificates);

        let action = apply_service_update(
            &self.api,
            inspection.load_balancer_id,
            &update,
            self.config.poll_interval(),
            self.config.action_timeout(),
        )
        .await
        .map_err(|source| RotationError::DetachError {
            listen_port: update.listen_port,
            certificate_id: old_certificate.id,
            source,
        })?;

        tracing::info!(
            load_balancer_id = inspection.load_balancer_id,
            listen_port = update.listen_port,
            certificate_id = old_certificate.id,
            action_id = action.id,
            "✂️ Detached old certificate"
        );
        Ok(update.certificates)
    }
}
