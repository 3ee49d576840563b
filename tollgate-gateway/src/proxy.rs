//! Outbound half of the gateway: one pooled HTTP client for every backend

use std::net::SocketAddr;

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

use crate::{
    config::GatewayConfig,
    error::{GatewayError, Result},
    headers,
    routes::Backend,
};

/// A buffered upstream reply with its headers already scrubbed
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

pub struct ProxyClient {
    client: reqwest::Client,
    auth_service_url: String,
    backend_service_url: String,
}

impl ProxyClient {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        // Redirects go back to the browser untouched; the federated flow relies on it.
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            auth_service_url: config.auth_service_url.clone(),
            backend_service_url: config.backend_service_url.clone(),
        })
    }

    pub fn origin(&self, backend: Backend) -> &str {
        match backend {
            Backend::Auth => &self.auth_service_url,
            Backend::Service => &self.backend_service_url,
        }
    }

    /// Upstream URL for `uri`: same path and query on the backend's origin
    pub fn target_url(&self, backend: Backend, uri: &Uri) -> String {
        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        format!("{}{}", self.origin(backend), path_and_query)
    }

    /// Send one request upstream and buffer the reply
    ///
    /// Dropping the returned future abandons the upstream call.
    pub async fn forward(
        &self,
        backend: Backend,
        method: Method,
        uri: &Uri,
        inbound_headers: &HeaderMap,
        body: Bytes,
        client_addr: Option<SocketAddr>,
    ) -> Result<UpstreamResponse> {
        let url = self.target_url(backend, uri);
        let mut outbound = headers::outbound_request_headers(inbound_headers, client_addr);

        if backend == Backend::Service && !outbound.contains_key(header::CONTENT_TYPE) {
            outbound.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }

        tracing::debug!(backend = backend.name(), %method, url = %url, "Forwarding request");

        let upstream = self
            .client
            .request(method, &url)
            .headers(outbound)
            .body(body)
            .send()
            .await
            .map_err(|e| GatewayError::BadGateway(format!("{url}: {e}")))?;

        let status = upstream.status();
        let headers = headers::inbound_response_headers(upstream.headers());
        let body = upstream
            .bytes()
            .await
            .map_err(|e| GatewayError::BadGateway(format!("{url}: {e}")))?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}
