//! Opaque object and column references.
//!
//! The core never interprets these names beyond splitting dotted paths; the
//! adapter (or a schema service behind it) resolves them into whatever the
//! backend needs.

use core::fmt;

use compact_str::{CompactString, ToCompactString};

use crate::error::{QuarryError, Result};

/// A dotted/qualified data object name (`"sales.orders"`) plus an optional alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    name: CompactString,
    alias: Option<CompactString>,
}

impl ObjectRef {
    /// Parses a dotted object name, rejecting blank names and blank segments.
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QuarryError::InvalidArgument(
                "object reference requires a name".into(),
            ));
        }
        if name.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(QuarryError::InvalidArgument(format!(
                "object reference '{name}' has an empty segment"
            )));
        }
        Ok(Self {
            name: name.to_compact_string(),
            alias: None,
        })
    }

    /// Attaches an alias.
    pub fn alias(mut self, alias: impl Into<CompactString>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The full dotted name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The last segment of the dotted name.
    pub fn base_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The alias when one is set, otherwise the name.
    pub fn alias_or_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Compares two object names ignoring case and underscores, the way
    /// backends commonly fold identifiers.
    pub fn names_match(a: &str, b: &str) -> bool {
        let fold = |s: &str| {
            s.chars()
                .filter(|c| *c != '_')
                .flat_map(char::to_lowercase)
                .collect::<CompactString>()
        };
        fold(a) == fold(b)
    }

    /// Column reference owned by this object (qualified by alias or name).
    pub fn column(&self, name: &str) -> ColumnRef {
        ColumnRef {
            owner: Some(self.alias_or_name().to_compact_string()),
            name: name.to_compact_string(),
            alias: None,
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} AS {}", self.name, alias),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Conversion into a resolvable [`ObjectRef`].
///
/// Absent and blank references fail with [`QuarryError::InvalidArgument`].
pub trait IntoObjectRef {
    fn into_object_ref(self) -> Result<ObjectRef>;
}

impl IntoObjectRef for ObjectRef {
    fn into_object_ref(self) -> Result<ObjectRef> {
        Ok(self)
    }
}

impl IntoObjectRef for &ObjectRef {
    fn into_object_ref(self) -> Result<ObjectRef> {
        Ok(self.clone())
    }
}

impl IntoObjectRef for &str {
    fn into_object_ref(self) -> Result<ObjectRef> {
        ObjectRef::parse(self)
    }
}

impl IntoObjectRef for String {
    fn into_object_ref(self) -> Result<ObjectRef> {
        ObjectRef::parse(&self)
    }
}

impl<T: IntoObjectRef> IntoObjectRef for Option<T> {
    fn into_object_ref(self) -> Result<ObjectRef> {
        match self {
            Some(target) => target.into_object_ref(),
            None => Err(QuarryError::InvalidArgument(
                "object reference is required".into(),
            )),
        }
    }
}

/// A column, optionally qualified by its owning object and aliased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    owner: Option<CompactString>,
    name: CompactString,
    alias: Option<CompactString>,
}

impl ColumnRef {
    /// Creates an unqualified column reference.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            owner: None,
            name: name.into(),
            alias: None,
        }
    }

    /// Attaches an output alias.
    pub fn alias(mut self, alias: impl Into<CompactString>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// `owner.name` when qualified, otherwise `name`.
    pub fn qualified(&self) -> CompactString {
        match &self.owner {
            Some(owner) => compact_str::format_compact!("{owner}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// The column name this reference produces in an output record.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified())?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

impl From<&str> for ColumnRef {
    fn from(path: &str) -> Self {
        col(path)
    }
}

impl From<String> for ColumnRef {
    fn from(path: String) -> Self {
        col(&path)
    }
}

/// Creates a column reference from a dotted path.
///
/// The last dot separates the owning object from the column name:
/// `col("sales.orders.total")` is column `total` of `sales.orders`.
pub fn col(path: &str) -> ColumnRef {
    match path.rsplit_once('.') {
        Some((owner, name)) if !owner.is_empty() => ColumnRef {
            owner: Some(owner.to_compact_string()),
            name: name.to_compact_string(),
            alias: None,
        },
        _ => ColumnRef::new(path),
    }
}

/// One entry of a projection list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Projection {
    /// A plain column.
    Column(ColumnRef),
    /// Row-count marker: the query yields a single `count` value.
    Count,
    /// Existence marker: the query yields one row when anything matches.
    Exists,
}

impl Projection {
    /// Output column name of the count marker.
    pub const COUNT_COLUMN: &'static str = "count";
    /// Output column name of the exists marker.
    pub const EXISTS_COLUMN: &'static str = "exists";

    /// Returns true for the count/exists markers.
    pub const fn is_marker(&self) -> bool {
        matches!(self, Projection::Count | Projection::Exists)
    }
}

impl From<ColumnRef> for Projection {
    fn from(column: ColumnRef) -> Self {
        Projection::Column(column)
    }
}

impl From<&str> for Projection {
    fn from(path: &str) -> Self {
        Projection::Column(col(path))
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Column(column) => write!(f, "{column}"),
            Projection::Count => write!(f, "COUNT(*)"),
            Projection::Exists => write!(f, "EXISTS"),
        }
    }
}
