// filter.rs
// Composable search restrictions for FindFolder and FindItem

use std::fmt;

use crate::error::{Error, Result};

/// Property paths a restriction can compare against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldUri {
    FolderDisplayName,
    MessageIsRead,
}

impl FieldUri {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldUri::FolderDisplayName => "folder:DisplayName",
            FieldUri::MessageIsRead => "message:IsRead",
        }
    }
}

impl fmt::Display for FieldUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The literal side of a comparison, as sent in `t:Constant/@Value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constant(String);

impl Constant {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant(value.to_string())
    }
}

impl From<String> for Constant {
    fn from(value: String) -> Self {
        Constant(value)
    }
}

impl From<bool> for Constant {
    fn from(value: bool) -> Self {
        Constant(value.to_string())
    }
}

impl From<u32> for Constant {
    fn from(value: u32) -> Self {
        Constant(value.to_string())
    }
}

/// A server-side predicate. Immutable once built and passed by value into
/// a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryFilter {
    Equals { field: FieldUri, constant: Constant },
    Or(Vec<QueryFilter>),
}

impl QueryFilter {
    /// True if an item whose `field` holds `value` would pass the filter.
    #[cfg(test)]
    pub(crate) fn matches(&self, field: FieldUri, value: &str) -> bool {
        match self {
            QueryFilter::Equals {
                field: candidate,
                constant,
            } => *candidate == field && constant.as_str() == value,
            QueryFilter::Or(filters) => filters.iter().any(|filter| filter.matches(field, value)),
        }
    }
}

pub struct FilterBuilder;

impl FilterBuilder {
    pub fn equals(field: FieldUri, constant: impl Into<Constant>) -> QueryFilter {
        QueryFilter::Equals {
            field,
            constant: constant.into(),
        }
    }

    /// Combines `filters` so that matching any one of them is enough.
    pub fn or<I>(filters: I) -> Result<QueryFilter>
    where
        I: IntoIterator<Item = QueryFilter>,
    {
        let filters: Vec<QueryFilter> = filters.into_iter().collect();
        if filters.is_empty() {
            return Err(Error::InvalidInput(
                "an Or filter needs at least one operand".to_string(),
            ));
        }
        Ok(QueryFilter::Or(filters))
    }

    /// `Or(Equals(field, v1), Equals(field, v2), ...)`.
    pub fn any_of<S: AsRef<str>>(field: FieldUri, values: &[S]) -> Result<QueryFilter> {
        FilterBuilder::or(
            values
                .iter()
                .map(|value| FilterBuilder::equals(field, value.as_ref())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_matches_either_literal() {
        let filter = FilterBuilder::or([
            FilterBuilder::equals(FieldUri::FolderDisplayName, "Inbox"),
            FilterBuilder::equals(FieldUri::FolderDisplayName, "Inkorg"),
        ])
        .unwrap();

        assert!(filter.matches(FieldUri::FolderDisplayName, "Inbox"));
        assert!(filter.matches(FieldUri::FolderDisplayName, "Inkorg"));
        assert!(!filter.matches(FieldUri::FolderDisplayName, "Posteingang"));
        assert!(!filter.matches(FieldUri::MessageIsRead, "Inbox"));
    }

    #[test]
    fn empty_or_is_rejected() {
        assert!(matches!(
            FilterBuilder::or(Vec::new()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn bool_constant_renders_as_xs_boolean() {
        let filter = FilterBuilder::equals(FieldUri::MessageIsRead, false);
        assert_eq!(
            filter,
            QueryFilter::Equals {
                field: FieldUri::MessageIsRead,
                constant: Constant::from("false"),
            }
        );
    }

    #[test]
    fn any_of_keeps_candidate_order() {
        let filter = FilterBuilder::any_of(FieldUri::FolderDisplayName, &["Inbox", "Inkorg"]).unwrap();
        let QueryFilter::Or(operands) = filter else {
            panic!("expected an Or filter");
        };
        assert_eq!(
            operands,
            vec![
                FilterBuilder::equals(FieldUri::FolderDisplayName, "Inbox"),
                FilterBuilder::equals(FieldUri::FolderDisplayName, "Inkorg"),
            ]
        );
    }
}
