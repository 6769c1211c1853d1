//! Unified type descriptors and the primitive type table.
//!
//! Every source of field types (response model rules, collection attributes,
//! route validators) is mapped to a [`GraphType`] first and converted to an
//! engine `TypeRef` only when the schema is registered.

use std::fmt;

use async_graphql::dynamic::{Scalar, TypeRef};

/// Name of the scalar that carries arbitrary JSON values.
pub const JSON_SCALAR: &str = "Json";

/// Shape of a GraphQL field or argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphType {
    Boolean,
    String,
    Int,
    Float,
    /// Arbitrary structured value (the shared [`JSON_SCALAR`]).
    Json,
    /// A named composite type.
    Object(String),
    List(Box<GraphType>),
    NonNull(Box<GraphType>),
}

impl GraphType {
    /// Wraps the type in a list.
    #[must_use]
    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    /// Wraps the type as non-null; already non-null types are returned as is.
    #[must_use]
    pub fn required(self) -> Self {
        match self {
            Self::NonNull(_) => self,
            other => Self::NonNull(Box::new(other)),
        }
    }

    /// Applies the list and required wrappers shared by all field sources.
    #[must_use]
    pub fn wrap(self, array: bool, required: bool) -> Self {
        let ty = if array { self.list() } else { self };
        if required { ty.required() } else { ty }
    }

    /// Returns `true` if the outermost wrapper is non-null.
    #[must_use]
    pub fn is_required(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// Name of the innermost named type.
    #[must_use]
    pub fn base_name(&self) -> &str {
        match self {
            Self::Boolean => TypeRef::BOOLEAN,
            Self::String => TypeRef::STRING,
            Self::Int => TypeRef::INT,
            Self::Float => TypeRef::FLOAT,
            Self::Json => JSON_SCALAR,
            Self::Object(name) => name,
            Self::List(inner) | Self::NonNull(inner) => inner.base_name(),
        }
    }

    /// Converts to the engine's type reference.
    #[must_use]
    pub fn to_type_ref(&self) -> TypeRef {
        match self {
            Self::List(inner) => TypeRef::List(Box::new(inner.to_type_ref())),
            Self::NonNull(inner) => TypeRef::NonNull(Box::new(inner.to_type_ref())),
            named => TypeRef::named(named.base_name().to_string()),
        }
    }
}

impl fmt::Display for GraphType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
            named => f.write_str(named.base_name()),
        }
    }
}

/// Maps a primitive type tag to its scalar.
///
/// Unknown tags, and the explicit `json`/`any`/`none` markers, map to
/// [`GraphType::Json`].
#[must_use]
pub fn map_primitive(tag: &str) -> GraphType {
    match tag {
        "boolean" => GraphType::Boolean,
        "string" => GraphType::String,
        "integer" => GraphType::Int,
        "float" | "double" => GraphType::Float,
        _ => GraphType::Json,
    }
}

/// Returns `true` for tags handled by [`map_primitive`] rather than by model lookup.
#[must_use]
pub fn is_primitive(tag: &str) -> bool {
    matches!(
        tag,
        "boolean" | "string" | "integer" | "float" | "double" | "json" | "any" | "none"
    )
}

/// Maps a collection attribute's type tag; unknown tags are stored as strings.
#[must_use]
pub fn map_attribute_type(tag: &str) -> GraphType {
    match tag {
        "boolean" => GraphType::Boolean,
        "integer" => GraphType::Int,
        "double" | "float" => GraphType::Float,
        _ => GraphType::String,
    }
}

/// The JSON scalar definition, registered once per schema.
#[must_use]
pub fn json_scalar() -> Scalar {
    Scalar::new(JSON_SCALAR).description("Arbitrary JSON value")
}

/// Rewrites a record key into a GraphQL field name.
///
/// A leading `$` (system metadata) becomes `_`; hyphens become underscores.
#[must_use]
pub fn escape_key(key: &str) -> String {
    let escaped = match key.strip_prefix('$') {
        Some(rest) => format!("_{rest}"),
        None => key.to_string(),
    };
    escaped.replace('-', "_")
}

/// Checks if a name is valid for GraphQL: `[_a-zA-Z][_a-zA-Z0-9]*`.
#[must_use]
pub fn is_valid_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Capitalizes the first character of a string.
#[must_use]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
