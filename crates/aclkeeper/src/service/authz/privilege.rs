use std::collections::BTreeSet;

use http::StatusCode;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::VariantArray;
use unicase::UniCase;

use crate::{
    api::{ErrorModel, ErrorResponse},
    service::error::impl_error_stack_methods,
};

/// Privileges that can be granted on schemas and tables.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::IntoStaticStr,
    strum_macros::VariantArray,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Privilege {
    Create,
    Select,
    Delete,
    Insert,
    Update,
}

impl Privilege {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Matches `name` against the privilege names ignoring case.
    pub fn parse(name: &str) -> Result<Self, InvalidPrivilege> {
        let wanted = UniCase::new(name);
        Self::VARIANTS
            .iter()
            .copied()
            .find(|privilege| UniCase::new(privilege.as_str()) == wanted)
            .ok_or_else(|| InvalidPrivilege::unknown(name))
    }
}

/// Non-empty set of privileges. Iterates in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PrivilegeSet(BTreeSet<Privilege>);

impl PrivilegeSet {
    /// Every privilege. Used when a statement names no privileges.
    #[must_use]
    pub fn all_privileges() -> Self {
        Self(Privilege::VARIANTS.iter().copied().collect())
    }

    /// Parses the privilege names of a statement. `None` means all privileges.
    pub fn parse<S: AsRef<str>>(names: Option<&[S]>) -> Result<Self, InvalidPrivilege> {
        let Some(names) = names else {
            return Ok(Self::all_privileges());
        };
        if names.is_empty() {
            return Err(InvalidPrivilege::empty());
        }
        names
            .iter()
            .map(|name| Privilege::parse(name.as_ref()))
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Privilege> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn contains(&self, privilege: Privilege) -> bool {
        self.0.contains(&privilege)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for PrivilegeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(", "))
    }
}

impl<'a> IntoIterator for &'a PrivilegeSet {
    type Item = Privilege;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, Privilege>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("{message}")]
pub struct InvalidPrivilege {
    pub privilege: Option<String>,
    pub message: String,
    pub stack: Vec<String>,
}
impl_error_stack_methods!(InvalidPrivilege);

impl InvalidPrivilege {
    #[must_use]
    pub fn unknown(privilege: &str) -> Self {
        Self {
            privilege: Some(privilege.to_string()),
            message: format!("Unknown privilege: '{privilege}'"),
            stack: Vec::new(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            privilege: None,
            message: "Privilege list must not be empty".to_string(),
            stack: Vec::new(),
        }
    }
}

impl From<InvalidPrivilege> for ErrorModel {
    fn from(err: InvalidPrivilege) -> Self {
        ErrorModel::builder()
            .r#type("InvalidPrivilege")
            .code(StatusCode::BAD_REQUEST.as_u16())
            .message(err.message)
            .stack(err.stack)
            .build()
    }
}

impl From<InvalidPrivilege> for ErrorResponse {
    fn from(err: InvalidPrivilege) -> Self {
        ErrorModel::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_privilege_ignores_case() {
        assert_eq!(Privilege::parse("select").unwrap(), Privilege::Select);
        assert_eq!(Privilege::parse("InSeRt").unwrap(), Privilege::Insert);
        assert_eq!(Privilege::parse("UPDATE").unwrap(), Privilege::Update);
        assert_eq!(Privilege::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_unknown_privilege() {
        let err = Privilege::parse("TRUNCATE").unwrap_err();
        assert_eq!(err.to_string(), "Unknown privilege: 'TRUNCATE'");
        assert_eq!(err.privilege.as_deref(), Some("TRUNCATE"));

        let model = ErrorModel::from(err);
        assert_eq!(model.code, 400);
        assert_eq!(model.r#type, "InvalidPrivilege");
    }

    #[test]
    fn test_absent_list_is_all_privileges() {
        let set = PrivilegeSet::parse::<String>(None).unwrap();
        assert_eq!(set, PrivilegeSet::all_privileges());
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![
                Privilege::Create,
                Privilege::Select,
                Privilege::Delete,
                Privilege::Insert,
                Privilege::Update
            ]
        );
    }

    #[test]
    fn test_duplicates_collapse() {
        let set = PrivilegeSet::parse(Some(&["select", "SELECT", "insert"][..])).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(Privilege::Select));
        assert!(set.contains(Privilege::Insert));
        assert_eq!(set.to_string(), "SELECT, INSERT");
    }

    #[test]
    fn test_first_unknown_name_fails_whole_list() {
        let err = PrivilegeSet::parse(Some(&["SELECT", "FOO", "BAR"][..])).unwrap_err();
        assert_eq!(err.privilege.as_deref(), Some("FOO"));
    }

    #[test]
    fn test_empty_list_is_rejected() {
        let names: Vec<String> = vec![];
        let err = PrivilegeSet::parse(Some(names.as_slice())).unwrap_err();
        assert_eq!(err, InvalidPrivilege::empty());
    }
}
