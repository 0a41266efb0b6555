use std::{
    error::Error as StdError,
    fmt::{Display, Formatter},
};

use http::StatusCode;
use itertools::Itertools;

use crate::{
    api::{ErrorModel, ErrorResponse},
    service::{
        authz::Privilege,
        error::{define_transparent_error, error_chain_fmt, impl_error_stack_methods},
    },
};

#[derive(Debug)]
pub struct AuthorizationBackendUnavailable {
    pub stack: Vec<String>,
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl_error_stack_methods!(AuthorizationBackendUnavailable);

impl PartialEq for AuthorizationBackendUnavailable {
    fn eq(&self, other: &Self) -> bool {
        self.stack == other.stack && self.source.to_string() == other.source.to_string()
    }
}

impl AuthorizationBackendUnavailable {
    pub fn new<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            stack: Vec::new(),
            source: Box::new(source),
        }
    }
}

impl StdError for AuthorizationBackendUnavailable {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.source as &(dyn StdError + 'static))
    }
}

impl Display for AuthorizationBackendUnavailable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "AuthorizationBackendError: {}", self.source)?;

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

impl From<AuthorizationBackendUnavailable> for ErrorModel {
    fn from(err: AuthorizationBackendUnavailable) -> Self {
        ErrorModel::builder()
            .r#type("AuthorizationBackendError")
            .code(StatusCode::SERVICE_UNAVAILABLE.as_u16())
            .message("Authorization service is unavailable")
            .stack(err.stack)
            .source(Some(err.source))
            .build()
    }
}

impl From<AuthorizationBackendUnavailable> for ErrorResponse {
    fn from(err: AuthorizationBackendUnavailable) -> Self {
        ErrorModel::from(err).into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RevokeObjectType {
    Schema,
    Table,
}

/// The user may not revoke one or more privileges on a schema or table.
#[derive(Debug, PartialEq, Eq)]
pub struct AuthZRevokePrivilegeForbidden {
    pub object_type: RevokeObjectType,
    pub object: String,
    pub privileges: Vec<Privilege>,
    pub user: String,
    pub stack: Vec<String>,
}

impl_error_stack_methods!(AuthZRevokePrivilegeForbidden);

impl AuthZRevokePrivilegeForbidden {
    #[must_use]
    pub fn new(
        object_type: RevokeObjectType,
        object: &impl ToString,
        privilege: Privilege,
        user: impl Into<String>,
    ) -> Self {
        Self {
            object_type,
            object: object.to_string(),
            privileges: vec![privilege],
            user: user.into(),
            stack: Vec::new(),
        }
    }

    /// Folds denials on the same object into one error listing every denied privilege.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        debug_assert_eq!(self.object, other.object);
        let Self {
            object_type,
            object,
            mut privileges,
            user,
            mut stack,
        } = self;
        privileges.extend(other.privileges);
        stack.extend(other.stack);
        Self {
            object_type,
            object,
            privileges: privileges.into_iter().unique().collect(),
            user,
            stack: stack.into_iter().unique().collect(),
        }
    }
}

impl Display for AuthZRevokePrivilegeForbidden {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let noun = if self.privileges.len() == 1 {
            "privilege"
        } else {
            "privileges"
        };
        write!(
            f,
            "Access Denied: Cannot revoke {noun} {} on {} {}",
            self.privileges.iter().join(", "),
            self.object_type,
            self.object
        )
    }
}

impl StdError for AuthZRevokePrivilegeForbidden {}

impl From<AuthZRevokePrivilegeForbidden> for ErrorModel {
    fn from(err: AuthZRevokePrivilegeForbidden) -> Self {
        let message = err.to_string();
        ErrorModel::forbidden(message, "AccessDenied", None)
            .append_detail(format!("Denied for user `{}`", err.user))
            .append_details(err.stack)
    }
}

define_transparent_error! {
    pub enum CheckRevokePrivilegeError,
    stack_message: "Error checking revoke privilege",
    variants: [
        AuthZRevokePrivilegeForbidden,
        AuthorizationBackendUnavailable,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_message() {
        let err = AuthZRevokePrivilegeForbidden::new(
            RevokeObjectType::Table,
            &"c.s.t",
            Privilege::Select,
            "alice",
        );
        assert_eq!(
            err.to_string(),
            "Access Denied: Cannot revoke privilege SELECT on table c.s.t"
        );

        let model = ErrorModel::from(err);
        assert_eq!(model.code, 403);
        assert_eq!(model.r#type, "AccessDenied");
        assert_eq!(model.stack, vec!["Denied for user `alice`".to_string()]);
    }

    #[test]
    fn test_merged_forbidden_lists_all_privileges() {
        let select = AuthZRevokePrivilegeForbidden::new(
            RevokeObjectType::Schema,
            &"hive.reporting",
            Privilege::Select,
            "alice",
        );
        let delete = AuthZRevokePrivilegeForbidden::new(
            RevokeObjectType::Schema,
            &"hive.reporting",
            Privilege::Delete,
            "alice",
        );
        assert_eq!(
            select.merge(delete).to_string(),
            "Access Denied: Cannot revoke privileges SELECT, DELETE on schema hive.reporting"
        );
    }

    #[test]
    fn test_check_error_carries_stack_message() {
        let err = CheckRevokePrivilegeError::from(AuthorizationBackendUnavailable::new(
            std::io::Error::other("policy engine timed out"),
        ));
        let model = ErrorModel::from(err);
        assert_eq!(model.code, 503);
        assert_eq!(model.r#type, "AuthorizationBackendError");
        assert_eq!(model.stack, vec!["Error checking revoke privilege".to_string()]);
    }
}
