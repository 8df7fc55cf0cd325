use crate::core::CloudApi;
use crate::domain::model::{Certificate, CertificateCreateOpts, RenewalRequest, MARKER_LABEL};
use crate::utils::error::{Result, RotationError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;

/// `<lineage basename>-<unix seconds>`, e.g. `example.com-1700000000`.
pub fn certificate_name(lineage_path: &Path, now: DateTime<Utc>) -> Result<String> {
    let base = lineage_path
        .file_name()
        .ok_or_else(|| RotationError::InvalidConfigValueError {
            field: "RENEWED_LINEAGE".to_string(),
            value: lineage_path.to_string_lossy().into_owned(),
            reason: "Path must end in a lineage directory name".to_string(),
        })?;
    Ok(format!("{}-{}", base.to_string_lossy(), now.timestamp()))
}

pub fn create_opts(request: &RenewalRequest, now: DateTime<Utc>) -> Result<CertificateCreateOpts> {
    Ok(CertificateCreateOpts {
        name: certificate_name(&request.lineage_path, now)?,
        certificate: request.full_chain_pem.clone(),
        private_key: request.private_key_pem.clone(),
        labels: HashMap::from([(MARKER_LABEL.to_string(), "true".to_string())]),
        domain_names: request.domains.clone(),
    })
}

/// Uploads the renewed material. Nothing on the load balancer is touched here.
pub async fn publish<A: CloudApi + ?Sized>(
    api: &A,
    request: &RenewalRequest,
    now: DateTime<Utc>,
) -> Result<Certificate> {
    let opts = create_opts(request, now)?;
    tracing::debug!(name = %opts.name, domains = ?opts.domain_names, "Uploading certificate");

    let cert = api
        .create_certificate(&opts)
        .await
        .map_err(|source| RotationError::PublishError {
            name: opts.name.clone(),
            source,
        })?;

    tracing::info!(
        certificate_id = cert.id,
        certificate_name = %cert.name,
        fingerprint = ?cert.fingerprint,
        not_valid_after = ?cert.not_valid_after,
        "📤 Uploaded renewed certificate"
    );
    Ok(cert)
}
