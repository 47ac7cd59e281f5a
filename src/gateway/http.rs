use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{AppError, AppResult};

use super::traits::{Method, Transport, WireRequest, WireResponse};

/// [`Transport`] over a blocking HTTP client. One client is shared across
/// all gateway workers; connection pooling lives there.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| AppError::transport("client construction", source))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &WireRequest) -> AppResult<WireResponse> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url).query(&request.params),
            Method::Post => self.client.post(&request.url).form(&request.params),
        };
        let response = builder
            .send()
            .map_err(|source| AppError::transport(&request.url, source))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|source| AppError::transport(&request.url, source))?;
        Ok(WireResponse { status, body })
    }
}
