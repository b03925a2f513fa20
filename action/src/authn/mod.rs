//! Authentication against the CES REST API
//!
//! Requests are authenticated either with a CES token, sent verbatim in the
//! `Authorization` header, or with a client certificate. In certificate mode
//! the host and port of the Code Pipeline instance are taken from the SRID
//! (`host-port`).

use std::io::Cursor;

use secrecy::{ExposeSecret, SecretString};

use crate::errors::DeployError;
use crate::utils::string_has_content;

/// Header carrying the client certificate for CES
pub const CERTIFICATE_HEADER: &str = "javax.servlet.request.X509Certificate";

/// Header carrying the host of the Code Pipeline instance
pub const HOST_HEADER: &str = "cpwr_hci_host";

/// Header carrying the port of the Code Pipeline instance
pub const PORT_HEADER: &str = "cpwr_hci_port";

const PEM_CERTIFICATE_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_CERTIFICATE_END: &str = "-----END CERTIFICATE-----";

/// How requests to the deployment service are authenticated
#[derive(Debug)]
pub enum AuthMode {
    Token(SecretString),
    Certificate(CertificateAuth),
}

/// Certificate credentials and the instance they address
#[derive(Debug, Clone)]
pub struct CertificateAuth {
    /// Certificate as supplied: base64 DER, or a PEM bundle
    pub certificate: String,
    pub host: String,
    pub port: String,
}

impl CertificateAuth {
    /// Build certificate credentials, routing by the SRID
    pub fn new(certificate: &str, srid: &str) -> Result<Self, DeployError> {
        let (host, port) = split_srid(srid)?;
        Ok(Self {
            certificate: certificate.to_string(),
            host,
            port,
        })
    }

    /// Certificate value for the certificate header: the base64 body, no whitespace
    pub fn header_value(&self) -> String {
        let encoded = match (
            self.certificate.find(PEM_CERTIFICATE_BEGIN),
            self.certificate.find(PEM_CERTIFICATE_END),
        ) {
            (Some(begin), Some(end)) if begin < end => {
                &self.certificate[begin + PEM_CERTIFICATE_BEGIN.len()..end]
            }
            _ => self.certificate.as_str(),
        };
        encoded.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// The PEM bundle, when it carries a private key usable as a TLS client identity
    pub fn identity_pem(&self) -> Result<Option<Vec<u8>>, DeployError> {
        if !self.certificate.contains(PEM_CERTIFICATE_BEGIN) {
            return Ok(None);
        }

        let mut reader = Cursor::new(self.certificate.as_bytes());
        let key = rustls_pemfile::private_key(&mut reader)
            .map_err(|e| DeployError::Certificate(format!("Failed to parse private key: {}", e)))?;

        Ok(key.map(|_| self.certificate.as_bytes().to_vec()))
    }
}

impl AuthMode {
    /// Token authentication wins when both credentials are present
    pub fn select(
        token: Option<&str>,
        certificate: Option<&str>,
        srid: &str,
    ) -> Result<Self, DeployError> {
        match (token, certificate) {
            (Some(token), _) if string_has_content(Some(token)) => {
                Ok(AuthMode::Token(SecretString::from(token.trim().to_string())))
            }
            (_, Some(certificate)) if string_has_content(Some(certificate)) => {
                Ok(AuthMode::Certificate(CertificateAuth::new(certificate, srid)?))
            }
            _ => Err(DeployError::MissingArgument(
                "Either a CES token or a certificate is required to submit the deploy request."
                    .to_string(),
            )),
        }
    }

    /// Token value, for token authentication
    pub fn token(&self) -> Option<&str> {
        match self {
            AuthMode::Token(token) => Some(token.expose_secret()),
            AuthMode::Certificate(_) => None,
        }
    }
}

/// Split an SRID of the form `host-port`
pub fn split_srid(srid: &str) -> Result<(String, String), DeployError> {
    let mut parts = srid.split('-');
    match (parts.next(), parts.next()) {
        (Some(host), Some(port)) if !host.is_empty() && !port.is_empty() => {
            Ok((host.to_string(), port.to_string()))
        }
        _ => Err(DeployError::Config(format!(
            "The SRID '{}' does not have the form host-port required for certificate authentication",
            srid
        ))),
    }
}
