//! Parsed statement model handed to data definition tasks.
//!
//! Statements arrive fully parsed. Nothing in here validates names against the
//! catalog; that happens when a task resolves its target.
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Object kind named by a `GRANT`/`REVOKE` statement.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum GrantOnType {
    Schema,
    Table,
}

/// Dotted name as written in the statement, e.g. `hive.sales.orders`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(Vec<String>);

impl QualifiedName {
    #[must_use]
    pub fn new(parts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Splits `name` on `.`. Quoting is the parser's concern.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        Self::new(name.split('.'))
    }

    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.0
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

impl Display for QualifiedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PrincipalKind {
    #[default]
    Unspecified,
    User,
    Role,
}

/// Grantee as written: `alice`, `USER alice` or `ROLE analysts`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TypedBuilder)]
pub struct PrincipalSpecification {
    #[builder(default)]
    pub kind: PrincipalKind,
    #[builder(setter(into))]
    pub name: String,
}

impl PrincipalSpecification {
    #[must_use]
    pub fn user(name: impl Into<String>) -> Self {
        Self::builder().kind(PrincipalKind::User).name(name).build()
    }

    #[must_use]
    pub fn role(name: impl Into<String>) -> Self {
        Self::builder().kind(PrincipalKind::Role).name(name).build()
    }
}

/// Position of a statement in the submitted query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLocation {
    pub line: u32,
    pub column: u32,
}

impl Display for NodeLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}:{}", self.line, self.column)
    }
}

/// `REVOKE [GRANT OPTION FOR] { privileges | ALL PRIVILEGES } ON [SCHEMA | TABLE] name FROM grantee`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct Revoke {
    #[builder(default, setter(strip_option))]
    pub r#type: Option<GrantOnType>,
    pub name: QualifiedName,
    /// `None` means `ALL PRIVILEGES`.
    #[builder(default, setter(strip_option))]
    pub privileges: Option<Vec<String>>,
    pub grantee: PrincipalSpecification,
    #[builder(default)]
    pub grant_option_for: bool,
    #[builder(default, setter(strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<NodeLocation>,
}

impl Revoke {
    #[must_use]
    pub fn targets_schema(&self) -> bool {
        self.r#type == Some(GrantOnType::Schema)
    }
}

/// Bound value for a `?` placeholder in the statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Expression {
    Null,
    Boolean(bool),
    Long(i64),
    Double(f64),
    String(String),
}

/// Statements the data definition dispatcher accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "statement", rename_all = "kebab-case")]
pub enum Statement {
    Revoke(Revoke),
    /// Any statement without a data definition task, identified by its keyword.
    #[from(skip)]
    Other { kind: String },
}

impl Statement {
    /// Command name used to route the statement to its task.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Statement::Revoke(_) => "REVOKE",
            Statement::Other { kind } => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_grant_on_type_parses_case_insensitively() {
        assert_eq!(GrantOnType::from_str("schema").unwrap(), GrantOnType::Schema);
        assert_eq!(GrantOnType::from_str("TABLE").unwrap(), GrantOnType::Table);
        assert!(GrantOnType::from_str("view").is_err());
        assert_eq!(GrantOnType::Schema.to_string(), "SCHEMA");
    }

    #[test]
    fn test_qualified_name_display() {
        let name = QualifiedName::parse("hive.sales.orders");
        assert_eq!(name.len(), 3);
        assert_eq!(name.to_string(), "hive.sales.orders");
        assert_eq!(name.parts()[1], "sales");
    }

    #[test]
    fn test_revoke_builder_defaults_to_table_and_all_privileges() {
        let revoke = Revoke::builder()
            .name(QualifiedName::parse("db.sales"))
            .grantee(PrincipalSpecification::user("alice"))
            .build();
        assert!(!revoke.targets_schema());
        assert!(revoke.privileges.is_none());
        assert!(!revoke.grant_option_for);

        let revoke = Revoke::builder()
            .r#type(GrantOnType::Schema)
            .name(QualifiedName::parse("db.reporting"))
            .grantee(PrincipalSpecification::role("analysts"))
            .build();
        assert!(revoke.targets_schema());
    }

    #[test]
    fn test_statement_deserializes_from_json() {
        let statement: Statement = serde_json::from_value(serde_json::json!({
            "statement": "revoke",
            "type": "TABLE",
            "name": ["db", "sales"],
            "privileges": ["select", "INSERT"],
            "grantee": {"kind": "USER", "name": "alice"},
            "grant_option_for": false
        }))
        .unwrap();
        let Statement::Revoke(revoke) = &statement else {
            panic!("Expected REVOKE statement, got {statement:?}");
        };
        assert_eq!(revoke.name, QualifiedName::new(["db", "sales"]));
        assert_eq!(
            revoke.privileges.as_deref(),
            Some(&["select".to_string(), "INSERT".to_string()][..])
        );
        assert_eq!(statement.kind(), "REVOKE");
    }
}
