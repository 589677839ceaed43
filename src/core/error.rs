use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    /// Billing API, identity API, or parameter store failure, including
    /// responses that are missing the fields a report needs.
    #[error("{service} request failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },
    #[error("Failed to format report: {0}")]
    Format(String),
    #[error("Failed to deliver message: {0}")]
    Delivery(String),
}

impl ReportError {
    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            message: message.into(),
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
