use crate::core::matcher::same_domains;
use crate::core::CloudApi;
use crate::domain::model::{Certificate, LoadBalancer, Service, ServiceProtocol};
use crate::utils::error::{Result, RotationError};

/// What the rotation will act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub load_balancer_id: i64,
    pub service: Service,
    pub old_certificate: Option<Certificate>,
}

/// Picks the HTTPS service to rotate.
///
/// Without an explicit `listen_port` the first HTTPS service wins; other
/// HTTPS listeners on the same load balancer are left alone.
pub fn select_https_service(lb: &LoadBalancer, listen_port: Option<u16>) -> Result<&Service> {
    lb.services
        .iter()
        .filter(|s| s.protocol == ServiceProtocol::Https)
        .find(|s| listen_port.map_or(true, |port| s.listen_port == port))
        .ok_or(RotationError::NoHttpsService {
            load_balancer_id: lb.id,
            listen_port,
        })
}

/// Fetches the load balancer and finds the bound certificate whose domain
/// names equal `domains`. If several match, the last one bound is kept.
pub async fn inspect<A: CloudApi + ?Sized>(
    api: &A,
    load_balancer_id: i64,
    listen_port: Option<u16>,
    domains: &[String],
) -> Result<Inspection> {
    let lb = api
        .get_load_balancer(load_balancer_id)
        .await
        .map_err(|source| RotationError::LoadBalancerLookupError {
            id: load_balancer_id,
            source,
        })?
        .ok_or(RotationError::LoadBalancerNotFound {
            id: load_balancer_id,
        })?;

    let service = select_https_service(&lb, listen_port)?.clone();
    tracing::debug!(
        load_balancer_id,
        load_balancer_name = %lb.name,
        listen_port = service.listen_port,
        destination_port = service.destination_port,
        bound = service.certificates.len(),
        "Selected HTTPS service"
    );

    let mut old_certificate = None;
    for bound in &service.certificates {
        let cert = api
            .get_certificate(bound.id)
            .await
            .map_err(|source| RotationError::CertificateLookupError {
                id: bound.id,
                source,
            })?
            .ok_or(RotationError::CertificateNotFound {
                id: bound.id,
                listen_port: service.listen_port,
            })?;

        if same_domains(domains, &cert.domain_names) {
            old_certificate = Some(cert);
        }
    }

    match &old_certificate {
        Some(cert) => tracing::info!(
            load_balancer_id,
            listen_port = service.listen_port,
            certificate_id = cert.id,
            certificate_name = %cert.name,
            fingerprint = ?cert.fingerprint,
            not_valid_after = ?cert.not_valid_after,
            managed = cert.is_managed(),
            "🔍 Found certificate to retire"
        ),
        None => tracing::info!(
            load_balancer_id,
            listen_port = service.listen_port,
            "🔍 No bound certificate matches the renewed domains"
        ),
    }

    Ok(Inspection {
        load_balancer_id,
        service,
        old_certificate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fake::{certificate, domains, load_balancer, service, FakeCloud};

    #[tokio::test]
    async fn test_selects_matching_certificate_among_several() {
        let cloud = FakeCloud::new()
            .with_certificate(certificate(1, &["x", "y"]))
            .with_certificate(certificate(2, &["p", "q"]))
            .with_load_balancer(load_balancer(
                10,
                vec![service(443, ServiceProtocol::Https, &[1, 2])],
            ));

        let inspection = inspect(&cloud, 10, None, &domains(&["q", "p"]))
            .await
            .unwrap();

        assert_eq!(inspection.service.listen_port, 443);
        assert_eq!(inspection.old_certificate.unwrap().id, 2);
    }

    #[tokio::test]
    async fn test_last_matching_certificate_wins() {
        let cloud = FakeCloud::new()
            .with_certificate(certificate(1, &["a"]))
            .with_certificate(certificate(2, &["a"]))
            .with_load_balancer(load_balancer(
                10,
                vec![service(443, ServiceProtocol::Https, &[1, 2])],
            ));

        let inspection = inspect(&cloud, 10, None, &domains(&["a"])).await.unwrap();
        assert_eq!(inspection.old_certificate.unwrap().id, 2);
    }

    #[tokio::test]
    async fn test_no_match_returns_none() {
        let cloud = FakeCloud::new()
            .with_certificate(certificate(1, &["a"]))
            .with_load_balancer(load_balancer(
                10,
                vec![service(443, ServiceProtocol::Https, &[1])],
            ));

        let inspection = inspect(&cloud, 10, None, &domains(&["a", "b"]))
            .await
            .unwrap();
        assert!(inspection.old_certificate.is_none());
    }

    #[tokio::test]
    async fn test_first_https_service_is_selected() {
        let cloud = FakeCloud::new().with_load_balancer(load_balancer(
            10,
            vec![
                service(80, ServiceProtocol::Http, &[]),
                service(443, ServiceProtocol::Https, &[]),
                service(8443, ServiceProtocol::Https, &[]),
            ],
        ));

        let inspection = inspect(&cloud, 10, None, &domains(&["a"])).await.unwrap();
        assert_eq!(inspection.service.listen_port, 443);

        let inspection = inspect(&cloud, 10, Some(8443), &domains(&["a"]))
            .await
            .unwrap();
        assert_eq!(inspection.service.listen_port, 8443);
    }

    #[tokio::test]
    async fn test_missing_https_service_is_a_lookup_error() {
        let cloud = FakeCloud::new().with_load_balancer(load_balancer(
            10,
            vec![service(80, ServiceProtocol::Http, &[])],
        ));

        let err = inspect(&cloud, 10, None, &domains(&["a"])).await.unwrap_err();
        assert!(matches!(
            err,
            RotationError::NoHttpsService {
                load_balancer_id: 10,
                listen_port: None
            }
        ));

        let cloud = FakeCloud::new().with_load_balancer(load_balancer(
            10,
            vec![service(443, ServiceProtocol::Https, &[])],
        ));
        let err = inspect(&cloud, 10, Some(8443), &domains(&["a"]))
            .await
            .unwrap_err();
        assert!(matches!(err, RotationError::NoHttpsService { .. }));
    }

    #[tokio::test]
    async fn test_unknown_load_balancer() {
        let cloud = FakeCloud::new();
        let err = inspect(&cloud, 99, None, &domains(&["a"])).await.unwrap_err();
        assert!(matches!(err, RotationError::LoadBalancerNotFound { id: 99 }));
    }

    #[tokio::test]
    async fn test_bound_certificate_lookup_failures_are_fatal() {
        let cloud = FakeCloud::new()
            .with_certificate(certificate(1, &["a"]))
            .with_load_balancer(load_balancer(
                10,
                vec![service(443, ServiceProtocol::Https, &[1, 2])],
            ));
        let err = inspect(&cloud, 10, None, &domains(&["a"])).await.unwrap_err();
        assert!(matches!(
            err,
            RotationError::CertificateNotFound {
                id: 2,
                listen_port: 443
            }
        ));

        let cloud = FakeCloud::new()
            .with_certificate(certificate(1, &["a"]))
            .with_load_balancer(load_balancer(
                10,
                vec![service(443, ServiceProtocol::Https, &[1])],
            ))
            .break_certificate_lookup(1);
        let err = inspect(&cloud, 10, None, &domains(&["a"])).await.unwrap_err();
        assert!(matches!(
            err,
            RotationError::CertificateLookupError { id: 1, .. }
        ));
    }
}
