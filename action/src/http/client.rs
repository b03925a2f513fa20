//! HTTP client implementation

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::debug;

use crate::authn::{AuthMode, CERTIFICATE_HEADER, HOST_HEADER, PORT_HEADER};
use crate::errors::DeployError;

/// Timeout for a single request to the deployment service
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the CES REST API
pub struct HttpClient {
    client: Client,
    auth_headers: HeaderMap,
}

impl HttpClient {
    /// Create a new HTTP client authenticating with the given mode
    pub fn new(auth: &AuthMode) -> Result<Self, DeployError> {
        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);

        if let AuthMode::Certificate(cert) = auth {
            if let Some(pem) = cert.identity_pem()? {
                debug!("Presenting the certificate as TLS client identity");
                let identity = reqwest::Identity::from_pem(&pem).map_err(|e| {
                    DeployError::Certificate(format!("Failed to create identity: {}", e))
                })?;
                builder = builder.identity(identity);
            }
        }

        Ok(Self {
            client: builder.build()?,
            auth_headers: auth_headers(auth)?,
        })
    }

    /// Start a request carrying the authentication headers
    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .headers(self.auth_headers.clone())
            .header(header::CONTENT_TYPE, "application/json")
    }

    /// Send a request; a failure here never reached the service
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, DeployError> {
        Ok(request.send().await?)
    }
}

fn header_value(value: &str, what: &str) -> Result<HeaderValue, DeployError> {
    HeaderValue::from_str(value)
        .map_err(|e| DeployError::Config(format!("Invalid {} header value: {}", what, e)))
}

/// Headers identifying the caller to CES
fn auth_headers(auth: &AuthMode) -> Result<HeaderMap, DeployError> {
    let mut headers = HeaderMap::new();
    match auth {
        AuthMode::Token(_) => {
            let mut token = header_value(auth.token().unwrap_or_default(), "token")?;
            token.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, token);
        }
        AuthMode::Certificate(cert) => {
            let mut certificate = header_value(&cert.header_value(), "certificate")?;
            certificate.set_sensitive(true);
            // Mixed case name, which `HeaderName::from_static` rejects
            let name = HeaderName::from_bytes(CERTIFICATE_HEADER.as_bytes())
                .map_err(|e| DeployError::Config(e.to_string()))?;
            headers.insert(name, certificate);
            headers.insert(HOST_HEADER, header_value(&cert.host, "host")?);
            headers.insert(PORT_HEADER, header_value(&cert.port, "port")?);
        }
    }
    Ok(headers)
}
