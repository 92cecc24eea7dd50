//! The scope expression language.
//!
//! A scope expression is attached to a field and states which permission sets
//! may see (on marshal) or set (on unmarshal) that field.
//!
//! ```text
//! Expression := Clause (',' Clause)*
//! Clause     := Name ('+' Name)*
//! ```
//!
//! `,` is OR and `+` is AND, so `"compliance,admin+pii"` reads as
//! `compliance OR (admin AND pii)`. An empty expression places no restriction
//! on the field. Whitespace around separators is ignored.

use std::{fmt, str::FromStr};

use thiserror::Error;

use super::permissions::PermissionSet;

/// Error produced when a raw scope expression is malformed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A clause is empty, e.g. `"admin,"`, `",admin"` or `"a,,b"`.
    #[error("scope expression `{expression}` has an empty clause at position {clause}")]
    EmptyClause { expression: String, clause: usize },
    /// A name inside a clause is empty, e.g. `"admin+"` or `"+pii"`.
    #[error(
        "scope expression `{expression}` has an empty permission name in clause {clause} at position {name}"
    )]
    EmptyName {
        expression: String,
        clause: usize,
        name: usize,
    },
    /// A name contains whitespace, e.g. `"read only"`.
    #[error("scope expression `{expression}` contains invalid permission name `{name}`")]
    InvalidName { expression: String, name: String },
}

/// One AND-group of permission names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Clause {
    names: Vec<String>,
}

impl Clause {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns `true` when every name in the clause is granted.
    pub fn is_satisfied_by(&self, permissions: &PermissionSet) -> bool {
        self.names.iter().all(|name| permissions.contains(name))
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join("+"))
    }
}

/// A parsed scope expression in OR-of-ANDs form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScopeExpression {
    raw: String,
    clauses: Vec<Clause>,
}

impl ScopeExpression {
    /// An expression with no clauses. It is satisfied by every permission set.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Parses the textual form of a scope expression.
    ///
    /// ```rust
    /// use fieldscope::{PermissionSet, ScopeExpression};
    ///
    /// let expr = ScopeExpression::parse("compliance,admin+pii").unwrap();
    /// assert_eq!(expr.clauses().len(), 2);
    /// assert!(expr.is_satisfied_by(&PermissionSet::from(["admin", "pii"])));
    /// assert!(!expr.is_satisfied_by(&PermissionSet::from(["admin"])));
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        if raw.trim().is_empty() {
            return Ok(Self {
                raw: raw.to_owned(),
                clauses: Vec::new(),
            });
        }

        let mut clauses = Vec::new();
        for (clause_index, clause) in raw.split(',').enumerate() {
            if clause.trim().is_empty() {
                return Err(ParseError::EmptyClause {
                    expression: raw.to_owned(),
                    clause: clause_index,
                });
            }
            let mut names = Vec::new();
            for (name_index, name) in clause.split('+').enumerate() {
                let name = name.trim();
                if name.is_empty() {
                    return Err(ParseError::EmptyName {
                        expression: raw.to_owned(),
                        clause: clause_index,
                        name: name_index,
                    });
                }
                if name.chars().any(char::is_whitespace) {
                    return Err(ParseError::InvalidName {
                        expression: raw.to_owned(),
                        name: name.to_owned(),
                    });
                }
                names.push(name.to_owned());
            }
            clauses.push(Clause { names });
        }

        Ok(Self {
            raw: raw.to_owned(),
            clauses,
        })
    }

    /// The text the expression was parsed from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns `true` when the expression places no restriction on the field.
    pub fn is_unrestricted(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluates the expression against a permission set.
    ///
    /// Clauses are checked in declaration order and evaluation stops at the
    /// first satisfied clause.
    pub fn is_satisfied_by(&self, permissions: &PermissionSet) -> bool {
        self.is_unrestricted()
            || self
                .clauses
                .iter()
                .any(|clause| clause.is_satisfied_by(permissions))
    }
}

impl FromStr for ScopeExpression {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

/// Canonical form: clauses joined by `,`, names joined by `+`, no whitespace.
impl fmt::Display for ScopeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, clause) in self.clauses.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            fmt::Display::fmt(clause, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(names: &[&str]) -> PermissionSet {
        PermissionSet::from(names)
    }

    #[test]
    fn empty_expression_is_unrestricted() {
        for raw in ["", "   ", "\t"] {
            let expr = ScopeExpression::parse(raw).unwrap();
            assert!(expr.is_unrestricted());
            assert!(expr.is_satisfied_by(&PermissionSet::new()));
        }
    }

    #[test]
    fn parses_or_of_ands() {
        let expr = ScopeExpression::parse("compliance,admin+pii").unwrap();
        let clauses: Vec<Vec<&str>> = expr
            .clauses()
            .iter()
            .map(|c| c.names().iter().map(String::as_str).collect())
            .collect();
        assert_eq!(clauses, vec![vec!["compliance"], vec!["admin", "pii"]]);
    }

    #[test]
    fn evaluates_compliance_scenario() {
        let expr = ScopeExpression::parse("compliance,admin+pii").unwrap();
        assert!(expr.is_satisfied_by(&perms(&["compliance"])));
        assert!(!expr.is_satisfied_by(&perms(&["admin"])));
        assert!(expr.is_satisfied_by(&perms(&["admin", "pii"])));
        assert!(!expr.is_satisfied_by(&perms(&["pii", "public"])));
    }

    #[test]
    fn whitespace_around_separators_is_ignored() {
        let spaced = ScopeExpression::parse(" compliance , admin + pii ").unwrap();
        let tight = ScopeExpression::parse("compliance,admin+pii").unwrap();
        assert_eq!(spaced.clauses(), tight.clauses());
        assert_eq!(spaced.to_string(), "compliance,admin+pii");
        assert_eq!(spaced.as_str(), " compliance , admin + pii ");
    }

    #[test]
    fn clause_order_does_not_change_result() {
        let forward = ScopeExpression::parse("a+b,c").unwrap();
        let backward = ScopeExpression::parse("c,b+a").unwrap();
        for granted in [
            &[][..],
            &["a"][..],
            &["a", "b"][..],
            &["c"][..],
            &["b", "c"][..],
        ] {
            let set = perms(granted);
            assert_eq!(forward.is_satisfied_by(&set), backward.is_satisfied_by(&set));
        }
    }

    #[test]
    fn names_are_case_sensitive() {
        let expr = ScopeExpression::parse("Admin").unwrap();
        assert!(!expr.is_satisfied_by(&perms(&["admin"])));
        assert!(expr.is_satisfied_by(&perms(&["Admin"])));
    }

    #[test]
    fn trailing_comma_is_rejected() {
        let err = ScopeExpression::parse("admin,").unwrap_err();
        assert!(matches!(err, ParseError::EmptyClause { clause: 1, .. }));
    }

    #[test]
    fn leading_and_doubled_commas_are_rejected() {
        assert!(matches!(
            ScopeExpression::parse(",admin"),
            Err(ParseError::EmptyClause { clause: 0, .. })
        ));
        assert!(matches!(
            ScopeExpression::parse("a,,b"),
            Err(ParseError::EmptyClause { clause: 1, .. })
        ));
    }

    #[test]
    fn dangling_plus_is_rejected() {
        assert!(matches!(
            ScopeExpression::parse("admin+"),
            Err(ParseError::EmptyName {
                clause: 0,
                name: 1,
                ..
            })
        ));
        assert!(matches!(
            ScopeExpression::parse("x,+pii"),
            Err(ParseError::EmptyName {
                clause: 1,
                name: 0,
                ..
            })
        ));
    }

    #[test]
    fn inner_whitespace_is_rejected() {
        let err = ScopeExpression::parse("read only").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidName {
                expression: "read only".into(),
                name: "read only".into(),
            }
        );
    }

    #[test]
    fn punctuation_inside_names_is_allowed() {
        let expr: ScopeExpression = "billing:read+org.admin".parse().unwrap();
        assert!(expr.is_satisfied_by(&perms(&["billing:read", "org.admin"])));
    }

    #[test]
    fn error_message_names_the_expression() {
        let err = ScopeExpression::parse("admin,").unwrap_err();
        assert!(err.to_string().contains("`admin,`"));
    }
}
