//! REST boundary for employee records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use shared::{
    domain::{EmployeeId, EmployeeRecord},
    protocol::{employee_route, ListEmployeesResponse, CSV_UPLOAD_FIELD, EMPLOYEES_ROUTE},
    query::{self, QueryState},
};
use tracing::debug;

use crate::{config::ClientSettings, error::GatewayError};

/// One page of records as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmployeePage {
    pub records: Vec<EmployeeRecord>,
    pub total: u64,
}

/// A CSV file picked by the user. The contents are not inspected client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl CsvUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Each method maps to exactly one HTTP request and is never retried.
#[async_trait]
pub trait EmployeeGateway: Send + Sync {
    async fn list(&self, query: &QueryState) -> Result<EmployeePage, GatewayError>;
    async fn create(&self, upload: CsvUpload) -> Result<(), GatewayError>;
    async fn update(&self, id: &EmployeeId, record: &EmployeeRecord) -> Result<(), GatewayError>;
    async fn delete_many(&self, ids: &[EmployeeId]) -> Result<(), GatewayError>;
}

#[derive(Debug, Clone)]
pub struct HttpEmployeeGateway {
    http: Client,
    base_url: String,
}

impl HttpEmployeeGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, GatewayError> {
        Self::new(
            settings.api_url.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}{EMPLOYEES_ROUTE}", self.base_url)
    }
}

#[async_trait]
impl EmployeeGateway for HttpEmployeeGateway {
    async fn list(&self, query: &QueryState) -> Result<EmployeePage, GatewayError> {
        let url = format!("{}?{}", self.collection_url(), query::encode(query));
        debug!(%url, "listing employees");
        let res = ensure_success(self.http.get(url).send().await?).await?;
        let body: ListEmployeesResponse = res.json().await?;
        let total = body.total.unwrap_or(body.data.len() as u64);
        Ok(EmployeePage {
            records: body.data,
            total,
        })
    }

    async fn create(&self, upload: CsvUpload) -> Result<(), GatewayError> {
        let size_bytes = upload.bytes.len();
        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str("text/csv")?;
        let form = multipart::Form::new().part(CSV_UPLOAD_FIELD, part);
        debug!(size_bytes, "uploading employee csv");
        ensure_success(
            self.http
                .post(self.collection_url())
                .multipart(form)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    async fn update(&self, id: &EmployeeId, record: &EmployeeRecord) -> Result<(), GatewayError> {
        let url = format!("{}{}", self.base_url, employee_route(id));
        debug!(%id, "updating employee");
        ensure_success(self.http.put(url).json(record).send().await?).await?;
        Ok(())
    }

    async fn delete_many(&self, ids: &[EmployeeId]) -> Result<(), GatewayError> {
        debug!(count = ids.len(), "deleting employees");
        ensure_success(
            self.http
                .delete(self.collection_url())
                .json(ids)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }
}

async fn ensure_success(res: Response) -> Result<Response, GatewayError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(GatewayError::Status { status, body })
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
