// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Server certificate trust decisions.
//!
//! A [`CertificateTrustPolicy`] is consulted during connect whenever the
//! selected endpoint presents a server certificate. [`AcceptAllPolicy`] is the
//! insecure default and exists only for commissioning; deployments should use
//! [`AllowListPolicy`] with the DER files of the known devices.

use std::fmt;
use std::path::PathBuf;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{OpcUaError, OpcUaResult, SecurityError};

// =============================================================================
// ServerCertificate / TrustDecision
// =============================================================================

/// A certificate presented by a server endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCertificate {
    /// Endpoint URL that presented the certificate.
    pub endpoint_url: String,

    /// DER-encoded certificate.
    pub der: Vec<u8>,
}

impl ServerCertificate {
    /// Creates a certificate record.
    pub fn new(endpoint_url: impl Into<String>, der: Vec<u8>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            der,
        }
    }

    /// Short printable digest of the certificate for log lines.
    pub fn summary(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.der);
        let head: String = encoded.chars().take(16).collect();
        format!("{} bytes, {}...", self.der.len(), head)
    }
}

/// Outcome of a trust evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustDecision {
    /// Trust the certificate for this connection.
    Accept,

    /// Refuse the certificate.
    Reject(String),
}

impl TrustDecision {
    /// Returns `true` for [`TrustDecision::Accept`].
    #[inline]
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

// =============================================================================
// CertificateTrustPolicy
// =============================================================================

/// Decides whether a server certificate is trusted.
pub trait CertificateTrustPolicy: Send + Sync {
    /// Evaluates one certificate.
    fn decide(&self, certificate: &ServerCertificate) -> TrustDecision;

    /// Policy name for logging.
    fn name(&self) -> &'static str;
}

impl fmt::Debug for dyn CertificateTrustPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertificateTrustPolicy({})", self.name())
    }
}

/// Accepts every certificate. Insecure.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllPolicy;

impl CertificateTrustPolicy for AcceptAllPolicy {
    fn decide(&self, certificate: &ServerCertificate) -> TrustDecision {
        tracing::warn!(
            endpoint = %certificate.endpoint_url,
            certificate = %certificate.summary(),
            "Accepting server certificate without verification"
        );
        TrustDecision::Accept
    }

    fn name(&self) -> &'static str {
        "accept-all"
    }
}

/// Rejects every certificate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAllPolicy;

impl CertificateTrustPolicy for RejectAllPolicy {
    fn decide(&self, _certificate: &ServerCertificate) -> TrustDecision {
        TrustDecision::Reject("all server certificates are rejected".to_string())
    }

    fn name(&self) -> &'static str {
        "reject-all"
    }
}

/// Accepts only certificates whose DER bytes match an entry exactly.
#[derive(Debug, Clone, Default)]
pub struct AllowListPolicy {
    allowed: Vec<Vec<u8>>,
}

impl AllowListPolicy {
    /// Creates a policy from DER-encoded certificates.
    pub fn new(allowed: Vec<Vec<u8>>) -> Self {
        Self { allowed }
    }

    /// Loads DER certificates from files.
    pub fn from_der_files(paths: &[PathBuf]) -> OpcUaResult<Self> {
        let mut allowed = Vec::with_capacity(paths.len());
        for path in paths {
            let der = std::fs::read(path).map_err(|e| {
                OpcUaError::security(SecurityError::certificate(format!(
                    "cannot read '{}': {}",
                    path.display(),
                    e
                )))
            })?;
            allowed.push(der);
        }
        Ok(Self { allowed })
    }

    /// Number of trusted certificates.
    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    /// Returns `true` if nothing is trusted.
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

impl CertificateTrustPolicy for AllowListPolicy {
    fn decide(&self, certificate: &ServerCertificate) -> TrustDecision {
        if self.allowed.iter().any(|der| *der == certificate.der) {
            TrustDecision::Accept
        } else {
            TrustDecision::Reject("certificate is not in the allow list".to_string())
        }
    }

    fn name(&self) -> &'static str {
        "allow-list"
    }
}

// =============================================================================
// TrustMode
// =============================================================================

/// Serializable choice of trust policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TrustMode {
    /// [`AcceptAllPolicy`].
    #[default]
    AcceptAll,

    /// [`RejectAllPolicy`].
    RejectAll,

    /// [`AllowListPolicy`] loaded from DER files.
    AllowList {
        /// Paths of trusted DER certificates.
        certificates: Vec<PathBuf>,
    },
}

impl TrustMode {
    /// Builds the policy this mode describes.
    pub fn into_policy(self) -> OpcUaResult<Box<dyn CertificateTrustPolicy>> {
        Ok(match self {
            Self::AcceptAll => Box::new(AcceptAllPolicy),
            Self::RejectAll => Box::new(RejectAllPolicy),
            Self::AllowList { certificates } => {
                Box::new(AllowListPolicy::from_der_files(&certificates)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cert(der: &[u8]) -> ServerCertificate {
        ServerCertificate::new("opc.tcp://rfu:4840", der.to_vec())
    }

    #[test]
    fn test_accept_all() {
        assert!(AcceptAllPolicy.decide(&cert(b"any")).is_accept());
    }

    #[test]
    fn test_reject_all() {
        assert!(!RejectAllPolicy.decide(&cert(b"any")).is_accept());
    }

    #[test]
    fn test_allow_list() {
        let policy = AllowListPolicy::new(vec![b"known".to_vec()]);
        assert_eq!(policy.len(), 1);
        assert!(policy.decide(&cert(b"known")).is_accept());
        assert!(matches!(
            policy.decide(&cert(b"other")),
            TrustDecision::Reject(_)
        ));
    }

    #[test]
    fn test_missing_der_file() {
        let err = AllowListPolicy::from_der_files(&[PathBuf::from("/nonexistent/rfu.der")])
            .unwrap_err();
        assert_eq!(err.category(), "security");
    }

    #[test]
    fn test_trust_mode_default() {
        let policy = TrustMode::default().into_policy().unwrap();
        assert_eq!(policy.name(), "accept-all");
    }

    #[test]
    fn test_summary() {
        let summary = cert(&[0u8; 32]).summary();
        assert!(summary.starts_with("32 bytes, "));
    }
}
