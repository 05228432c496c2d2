// transport.rs
// Delivery of encoded EWS requests to the server

use std::future::Future;
use std::time::Duration;

use log::{debug, info, trace};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};

use crate::auth::Credentials;
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::ews::soap;
use crate::ews::types::{EwsRequest, ResponseEnvelope};
use crate::impersonation::ImpersonationContext;

/// Per-call settings passed down from the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Overrides the transport's default request timeout.
    pub timeout: Option<Duration>,
}

impl CallOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        CallOptions {
            timeout: Some(timeout),
        }
    }
}

/// Performs one request/response exchange with the server.
///
/// Implementations own their credentials and endpoint. A transport-level
/// failure is returned as-is, never re-wrapped.
pub trait Transport {
    fn execute(
        &self,
        request: &EwsRequest,
        impersonation: &ImpersonationContext,
        options: &CallOptions,
    ) -> impl Future<Output = Result<ResponseEnvelope>> + Send;
}

/// SOAP over HTTPS with Basic authentication.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    credentials: Credentials,
    server_version: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: &str, credentials: Credentials, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(Error::InvalidInput("Exchange URL not configured".to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(HttpTransport {
            client,
            endpoint: format!("{}/EWS/Exchange.asmx", base_url),
            credentials,
            server_version: None,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.url, config.credentials(), config.timeout())?;
        Ok(match &config.server_version {
            Some(version) => transport.with_server_version(version),
            None => transport,
        })
    }

    pub fn with_server_version(mut self, version: &str) -> Self {
        self.server_version = Some(version.to_string());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    async fn execute(
        &self,
        request: &EwsRequest,
        impersonation: &ImpersonationContext,
        options: &CallOptions,
    ) -> Result<ResponseEnvelope> {
        let body = soap::encode_request(request, impersonation, self.server_version.as_deref())?;
        debug!(
            "Sending {} to {} as {}",
            request.name(),
            self.endpoint,
            impersonation.sid()
        );
        trace!("C: {}", String::from_utf8_lossy(&body));

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", soap::soap_action(request))
            .header(AUTHORIZATION, self.credentials.basic_auth_header())
            .body(body);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let document = response.bytes().await?;
        info!("{} returned HTTP {}", request.name(), status);
        trace!("S: {}", String::from_utf8_lossy(&document));

        match status {
            StatusCode::UNAUTHORIZED => Err(Error::Authentication),
            // Faults arrive with a 500 status and a SOAP body.
            StatusCode::INTERNAL_SERVER_ERROR => match soap::decode_response(&document) {
                Err(Error::XmlRead(_)) => Err(Error::HttpStatus(status.as_u16())),
                decoded => decoded,
            },
            status if status.is_success() => soap::decode_response(&document),
            status => Err(Error::HttpStatus(status.as_u16())),
        }
    }
}
