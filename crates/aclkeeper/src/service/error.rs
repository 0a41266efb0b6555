use std::{
    error::Error as StdError,
    fmt::{Display, Formatter},
};

use http::StatusCode;

use crate::api::{ErrorModel, ErrorResponse};

macro_rules! impl_error_stack_methods {
    ($error_type:ty) => {
        impl $error_type {
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

            pub fn append_detail_mut(&mut self, detail: impl Into<String>) {
                self.stack.push(detail.into());
            }
        }
    };
}

macro_rules! impl_from_with_detail {
    ($from_type:ty => $to_type:ident::$variant:ident, $detail:expr) => {
        impl From<$from_type> for $to_type {
            fn from(err: $from_type) -> Self {
                $to_type::$variant(err.append_detail($detail))
            }
        }
    };
}

/// Defines a fully transparent error enum with automatic conversion implementations.
///
/// This macro generates:
/// - An enum with all variants marked as `#[error(transparent)]`
/// - `impl_from_with_detail!` for each variant to add stack context
/// - `From<ErrorType> for ErrorModel` that delegates to variant conversions
/// - `From<ErrorType> for ErrorResponse` via `ErrorModel`
macro_rules! define_transparent_error {
    (
        $(#[$meta:meta])*
        $vis:vis enum $error_name:ident,
        stack_message: $stack_msg:expr,
        variants: [
            $($variant:ident),* $(,)?
        ]
    ) => {
        $(#[$meta])*
        #[derive(thiserror::Error, Debug)]
        $vis enum $error_name {
            $(
                #[error(transparent)]
                $variant($variant),
            )*
        }

        pastey::paste! {
            const [<$error_name:snake:upper _STACK>]: &str = $stack_msg;

            $(
                $crate::service::error::impl_from_with_detail!($variant => $error_name::$variant, [<$error_name:snake:upper _STACK>]);
            )*

            impl $error_name {
                #[must_use]
                pub fn append_detail(mut self, detail: impl Into<String>) -> Self {
                    self.append_detail_mut(detail);
                    self
                }

                pub fn append_detail_mut(&mut self, detail: impl Into<String>) -> &mut Self {
                    match self {
                        $(
                            $error_name::$variant(e) => {
                                e.append_detail_mut(detail);
                            }
                        )*
                    }
                    self
                }
            }

            impl From<$error_name> for $crate::api::ErrorModel {
                fn from(err: $error_name) -> Self {
                    match err {
                        $(
                            $error_name::$variant(e) => e.into(),
                        )*
                    }
                }
            }

            impl From<$error_name> for $crate::api::ErrorResponse {
                fn from(err: $error_name) -> Self {
                    $crate::api::ErrorModel::from(err).into()
                }
            }
        }
    };
}

macro_rules! define_simple_error {
    ($error_name:ident, $error_message:literal) => {
        #[derive(thiserror::Error, Debug, PartialEq)]
        #[error($error_message)]
        pub struct $error_name {
            pub stack: Vec<String>,
        }

        impl Default for $error_name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $error_name {
            #[must_use]
            pub fn new() -> Self {
                Self { stack: Vec::new() }
            }
        }

        $crate::service::error::impl_error_stack_methods!($error_name);
    };
}

pub(crate) use define_simple_error;
pub(crate) use define_transparent_error;
pub(crate) use impl_error_stack_methods;
pub(crate) use impl_from_with_detail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum CatalogBackendErrorType {
    Unexpected,
    ConcurrentModification,
}

/// Failure of the catalog while answering a lookup or applying a mutation.
#[derive(Debug)]
pub struct CatalogBackendError {
    pub r#type: CatalogBackendErrorType,
    pub stack: Vec<String>,
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl_error_stack_methods!(CatalogBackendError);

impl PartialEq for CatalogBackendError {
    fn eq(&self, other: &Self) -> bool {
        self.r#type == other.r#type
            && self.stack == other.stack
            && self.source.to_string() == other.source.to_string()
    }
}

impl CatalogBackendError {
    pub fn new<E>(source: E, r#type: impl Into<CatalogBackendErrorType>) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            r#type: r#type.into(),
            stack: Vec::new(),
            source: Box::new(source),
        }
    }

    pub fn new_unexpected<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::new(source, CatalogBackendErrorType::Unexpected)
    }
}

impl StdError for CatalogBackendError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.source as &(dyn StdError + 'static))
    }
}

impl Display for CatalogBackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "CatalogBackendError ({}): {}", self.r#type, self.source)?;

        if !self.stack.is_empty() {
            writeln!(f, "Stack:")?;
            for detail in &self.stack {
                writeln!(f, "  {detail}")?;
            }
        }

        if let Some(source) = self.source.source() {
            writeln!(f, "Caused by:")?;
            error_chain_fmt(source, f)?;
        }

        Ok(())
    }
}

pub(crate) fn error_chain_fmt(
    e: impl StdError,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }
    Ok(())
}

impl From<CatalogBackendError> for ErrorModel {
    fn from(err: CatalogBackendError) -> Self {
        let CatalogBackendError {
            r#type,
            stack,
            source,
        } = err;

        let code = match r#type {
            CatalogBackendErrorType::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogBackendErrorType::ConcurrentModification => StatusCode::CONFLICT,
        }
        .as_u16();

        ErrorModel::builder()
            .r#type("CatalogBackendError")
            .code(code)
            .message(format!("Catalog backend error ({type}): {source}"))
            .stack(stack)
            .source(Some(source))
            .build()
    }
}

impl From<CatalogBackendError> for ErrorResponse {
    fn from(err: CatalogBackendError) -> Self {
        ErrorModel::from(err).into()
    }
}

#[derive(thiserror::Error, PartialEq, Debug)]
#[error("{0}")]
pub struct InternalErrorMessage(pub String);
