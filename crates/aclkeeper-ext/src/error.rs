use std::{
    error::Error as StdError,
    fmt::{Display, Formatter},
};

use http::StatusCode;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uuid::Uuid;

fn error_chain_fmt(e: impl std::error::Error, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }
    Ok(())
}

fn error_chain_vec(e: &(dyn std::error::Error + Send + Sync + 'static)) -> Vec<String> {
    let mut details = Vec::new();
    let mut current = Some(e as &(dyn std::error::Error + 'static));
    while let Some(cause) = current {
        details.push(format!("{cause}"));
        current = cause.source();
    }
    details
}

impl From<ErrorModel> for ErrorResponse {
    fn from(value: ErrorModel) -> Self {
        ErrorResponse { error: value }
    }
}

impl From<ErrorResponse> for ErrorModel {
    fn from(value: ErrorResponse) -> Self {
        value.error
    }
}

impl Display for ErrorResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl StdError for ErrorResponse {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.error.source()
    }
}

/// Wrapper returned by statement executions that did not complete.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorModel,
}

/// Error payload surfaced to the client that submitted the statement.
#[derive(Default, Debug, TypedBuilder, Serialize, Deserialize)]
pub struct ErrorModel {
    /// Human-readable error message
    #[builder(setter(into))]
    pub message: String,
    /// Internal type definition of the error
    #[builder(setter(into))]
    pub r#type: String,
    /// HTTP-style status code
    pub code: u16,
    #[serde(skip)]
    #[builder(default)]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[builder(default)]
    pub stack: Vec<String>,
    #[serde(skip)]
    #[builder(default)]
    pub skip_log: bool,
    #[serde(skip)]
    #[builder(default=uuid::Uuid::now_v7())]
    pub error_id: Uuid,
}

impl StdError for ErrorModel {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl Display for ErrorModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} ({}): {}", self.r#type, self.code, self.message)?;

        if !self.stack.is_empty() {
            writeln!(f, "Stack:")?;
            for detail in &self.stack {
                writeln!(f, "  {detail}")?;
            }
        }

        if let Some(source) = self.source.as_ref() {
            writeln!(f, "Caused by:")?;
            // Dereference `source` to get `dyn StdError` and then take a reference to pass
            error_chain_fmt(&**source, f)?;
        }

        Ok(())
    }
}

impl ErrorModel {
    pub fn bad_request(
        message: impl Into<String>,
        r#type: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::new(message, r#type, StatusCode::BAD_REQUEST.as_u16(), source)
    }

    pub fn internal(
        message: impl Into<String>,
        r#type: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::new(
            message,
            r#type,
            StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            source,
        )
    }

    pub fn conflict(
        message: impl Into<String>,
        r#type: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::new(message, r#type, StatusCode::CONFLICT.as_u16(), source)
    }

    pub fn not_found(
        message: impl Into<String>,
        r#type: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::new(message, r#type, StatusCode::NOT_FOUND.as_u16(), source)
    }

    pub fn forbidden(
        message: impl Into<String>,
        r#type: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::new(message, r#type, StatusCode::FORBIDDEN.as_u16(), source)
    }

    pub fn service_unavailable(
        message: impl Into<String>,
        r#type: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::new(
            message,
            r#type,
            StatusCode::SERVICE_UNAVAILABLE.as_u16(),
            source,
        )
    }

    pub fn new(
        message: impl Into<String>,
        r#type: impl Into<String>,
        code: u16,
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::builder()
            .message(message)
            .r#type(r#type)
            .code(code)
            .source(source)
            .build()
    }

    #[must_use]
    pub fn append_details(mut self, details: impl IntoIterator<Item = String>) -> Self {
        self.stack.extend(details);
        self
    }

    #[must_use]
    pub fn append_detail(mut self, detail: impl Into<String>) -> Self {
        self.stack.push(detail.into());
        self
    }

    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.code >= 500
    }

    /// Logs the error once: `error` level for internal errors, `info` otherwise.
    pub fn trace(&self) {
        if self.skip_log {
            return;
        }
        let source = self
            .source
            .as_deref()
            .map(error_chain_vec)
            .unwrap_or_default();

        if self.is_internal() {
            tracing::error!(
                event_source = "statement_error",
                error_type = %self.r#type,
                code = self.code,
                message = %self.message,
                stack = ?self.stack,
                source = ?source,
                error_id = %self.error_id,
                "Internal error while executing statement"
            );
        } else {
            tracing::info!(
                event_source = "statement_error",
                error_type = %self.r#type,
                code = self.code,
                message = %self.message,
                stack = ?self.stack,
                error_id = %self.error_id,
                "Statement failed"
            );
        }
    }

    /// Strips everything the client should not see.
    /// Internal errors lose their stack, every error loses its source, and the
    /// error id is appended so the client can quote it.
    #[must_use]
    pub fn into_public(self) -> Self {
        let ErrorModel {
            message,
            r#type,
            code,
            source: _,
            stack,
            skip_log,
            error_id,
        } = self;

        let mut stack = if code >= 500 { Vec::new() } else { stack };
        stack.push(format!("Error ID: {error_id}"));

        ErrorModel {
            message,
            r#type,
            code,
            source: None,
            stack,
            skip_log,
            error_id,
        }
    }
}

impl ErrorResponse {
    #[must_use]
    pub fn append_details(mut self, details: impl IntoIterator<Item = String>) -> Self {
        self.error.stack.extend(details);
        self
    }

    #[must_use]
    pub fn append_detail(mut self, detail: impl Into<String>) -> Self {
        self.error.stack.push(detail.into());
        self
    }
}
