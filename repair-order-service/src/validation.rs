use std::fmt;
use std::iter;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use shared::{ApiError, ApiResult};
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Service,
    Employee,
}

impl ReferenceKind {
    fn path(self) -> &'static str {
        match self {
            ReferenceKind::Service => "services",
            ReferenceKind::Employee => "employees",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Service => write!(f, "service"),
            ReferenceKind::Employee => write!(f, "employee"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found,
    /// The reference data service answered with a non-success status.
    Rejected { status: StatusCode, body: String },
    /// No answer: connection failure or timeout.
    Unreachable(String),
}

/// Checks whether an identifier is currently known to the reference data
/// service.
#[async_trait]
pub trait IdentifierValidator: Send + Sync {
    async fn lookup(&self, kind: ReferenceKind, id: i32) -> LookupOutcome;
}

pub struct HttpReferenceValidator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReferenceValidator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl IdentifierValidator for HttpReferenceValidator {
    async fn lookup(&self, kind: ReferenceKind, id: i32) -> LookupOutcome {
        let url = format!("{}/{}/{}", self.base_url, kind.path(), id);
        debug!("Looking up {} {} at {}", kind, id, url);

        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => LookupOutcome::Found,
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                LookupOutcome::Rejected { status, body }
            }
            Err(e) => LookupOutcome::Unreachable(e.to_string()),
        }
    }
}

/// Confirms every service id, then the employee id, one lookup at a time.
/// The first failed lookup aborts the whole batch.
pub async fn validate_references(
    validator: &dyn IdentifierValidator,
    service_ids: &[i32],
    employee_id: i32,
) -> ApiResult<()> {
    let lookups = service_ids
        .iter()
        .map(|id| (ReferenceKind::Service, *id))
        .chain(iter::once((ReferenceKind::Employee, employee_id)));

    for (kind, id) in lookups {
        match validator.lookup(kind, id).await {
            LookupOutcome::Found => {}
            LookupOutcome::Rejected { status, body } => {
                warn!("Reference data service rejected {} {}: {} {}", kind, id, status, body);
                return Err(ApiError::UpstreamRejected {
                    status,
                    message: body,
                });
            }
            LookupOutcome::Unreachable(reason) => {
                let err = ApiError::UpstreamUnavailable(reason);
                error!(
                    retryable = err.is_retryable(),
                    "Could not check {} {}: {}", kind, id, err
                );
                return Err(err);
            }
        }
    }

    Ok(())
}
