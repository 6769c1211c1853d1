//! Route parameter validators.
//!
//! Validators form a closed set. A route parameter holds either a validator
//! instance or a factory that builds one from named framework resources
//! (for example a validator that needs a database handle to check IDs).

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::RestError;

/// A parameter validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Validator {
    /// Free text, optionally bounded.
    Text {
        #[serde(default, rename = "maxLength")]
        max_length: usize,
    },
    /// String whose length must fall in a range.
    Length { min: usize, max: usize },
    /// String restricted to an enumerated set.
    WhiteList { values: Vec<String> },
    Password,
    Email,
    Url,
    Host {
        #[serde(default)]
        allowed: Vec<String>,
    },
    Ip,
    Domain,
    #[serde(rename = "cname")]
    CName,
    Origin,
    Cron,
    Key,
    Uid,
    CustomId,
    HexColor,
    /// Reference to an uploaded file.
    File,
    Boolean,
    Numeric,
    Integer,
    Range { min: i64, max: i64 },
    #[serde(rename = "float")]
    FloatValue,
    Permissions,
    Roles,
    /// List whose elements are checked by another validator.
    ArrayList { validator: Box<Validator> },
    /// Associative array.
    Assoc,
    /// Raw JSON value.
    Json,
    /// Validator defined outside this set.
    Custom { name: String },
}

impl Validator {
    /// Wraps a validator as the element validator of a list.
    #[must_use]
    pub fn array_list(inner: Validator) -> Self {
        Self::ArrayList {
            validator: Box::new(inner),
        }
    }

    /// Element validator of an `ArrayList`; `None` for every other kind.
    #[must_use]
    pub fn inner(&self) -> Option<&Validator> {
        match self {
            Self::ArrayList { validator } => Some(validator),
            _ => None,
        }
    }

    /// Short name of the validator kind, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Text { .. } => "text",
            Self::Length { .. } => "length",
            Self::WhiteList { .. } => "whiteList",
            Self::Password => "password",
            Self::Email => "email",
            Self::Url => "url",
            Self::Host { .. } => "host",
            Self::Ip => "ip",
            Self::Domain => "domain",
            Self::CName => "cname",
            Self::Origin => "origin",
            Self::Cron => "cron",
            Self::Key => "key",
            Self::Uid => "uid",
            Self::CustomId => "customId",
            Self::HexColor => "hexColor",
            Self::File => "file",
            Self::Boolean => "boolean",
            Self::Numeric => "numeric",
            Self::Integer => "integer",
            Self::Range { .. } => "range",
            Self::FloatValue => "float",
            Self::Permissions => "permissions",
            Self::Roles => "roles",
            Self::ArrayList { .. } => "arrayList",
            Self::Assoc => "assoc",
            Self::Json => "json",
            Self::Custom { name } => name,
        }
    }
}

/// Named, type-erased framework resources available to validator factories.
#[derive(Default, Clone)]
pub struct Resources {
    entries: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Resources {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource under `name`.
    pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.entries.insert(name.into(), Arc::new(value));
    }

    /// Builder-style variant of [`Resources::insert`].
    #[must_use]
    pub fn with<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns `true` if a resource is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Collects the resources named in `injections`.
    ///
    /// # Errors
    ///
    /// Returns `RestError::MissingResource` for the first unknown name.
    pub fn inject(&self, injections: &[String]) -> Result<Injected, RestError> {
        let mut entries = HashMap::with_capacity(injections.len());
        for name in injections {
            let value = self.entries.get(name).ok_or_else(|| {
                warn!(resource = %name, "Validator factory requested an unknown resource");
                RestError::MissingResource(name.clone())
            })?;
            entries.insert(name.clone(), Arc::clone(value));
        }
        Ok(Injected { entries })
    }
}

impl fmt::Debug for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("Resources").field("names", &names).finish()
    }
}

/// The resources injected into one factory call.
pub struct Injected {
    entries: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Injected {
    /// Returns the injected resource `name` as a `T`.
    ///
    /// # Errors
    ///
    /// Returns `RestError::MissingResource` if `name` was not injected and
    /// `RestError::ResourceType` if it holds a different type.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<&T, RestError> {
        self.entries
            .get(name)
            .ok_or_else(|| RestError::MissingResource(name.to_string()))?
            .downcast_ref::<T>()
            .ok_or_else(|| RestError::ResourceType {
                name: name.to_string(),
            })
    }
}

type FactoryFn = dyn Fn(&Injected) -> Result<Validator, RestError> + Send + Sync;

/// Builds a validator from injected resources.
#[derive(Clone)]
pub struct ValidatorFactory(Arc<FactoryFn>);

impl ValidatorFactory {
    /// Wraps a factory closure.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&Injected) -> Result<Validator, RestError> + Send + Sync + 'static,
    {
        Self(Arc::new(factory))
    }

    /// Invokes the factory.
    ///
    /// # Errors
    ///
    /// Propagates the factory's error.
    pub fn call(&self, injected: &Injected) -> Result<Validator, RestError> {
        (self.0)(injected)
    }
}

impl fmt::Debug for ValidatorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValidatorFactory(..)")
    }
}

/// How a route parameter supplies its validator.
#[derive(Debug, Clone)]
pub enum ValidatorSource {
    /// A ready validator.
    Instance(Validator),
    /// A factory resolved with the parameter's injections.
    Factory(ValidatorFactory),
}

impl ValidatorSource {
    /// Returns the concrete validator, invoking the factory if needed.
    ///
    /// # Errors
    ///
    /// Fails if an injection is missing or the factory fails.
    pub fn resolve(
        &self,
        resources: &Resources,
        injections: &[String],
    ) -> Result<Validator, RestError> {
        match self {
            Self::Instance(validator) => Ok(validator.clone()),
            Self::Factory(factory) => factory.call(&resources.inject(injections)?),
        }
    }
}

impl From<Validator> for ValidatorSource {
    fn from(validator: Validator) -> Self {
        Self::Instance(validator)
    }
}

impl From<ValidatorFactory> for ValidatorSource {
    fn from(factory: ValidatorFactory) -> Self {
        Self::Factory(factory)
    }
}

impl<'de> Deserialize<'de> for ValidatorSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Validator::deserialize(deserializer).map(Self::Instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inner_accessor() {
        let list = Validator::array_list(Validator::Integer);
        assert_eq!(list.inner(), Some(&Validator::Integer));
        assert_eq!(Validator::Email.inner(), None);
    }

    #[test]
    fn test_deserialize_tagged() {
        let validator: Validator = serde_json::from_value(json!({
            "type": "arrayList",
            "validator": {"type": "text", "maxLength": 128}
        }))
        .unwrap();
        assert_eq!(
            validator,
            Validator::array_list(Validator::Text { max_length: 128 })
        );

        let cname: Validator = serde_json::from_value(json!({"type": "cname"})).unwrap();
        assert_eq!(cname, Validator::CName);
        let float: Validator = serde_json::from_value(json!({"type": "float"})).unwrap();
        assert_eq!(float, Validator::FloatValue);
    }

    #[test]
    fn test_factory_resolves_injections() {
        struct Limits {
            max: i64,
        }

        let resources = Resources::new().with("limits", Limits { max: 10 });
        let source = ValidatorSource::from(ValidatorFactory::new(|injected| {
            let limits = injected.get::<Limits>("limits")?;
            Ok(Validator::Range {
                min: 0,
                max: limits.max,
            })
        }));

        let validator = source
            .resolve(&resources, &["limits".to_string()])
            .unwrap();
        assert_eq!(validator, Validator::Range { min: 0, max: 10 });
    }

    #[test]
    fn test_factory_missing_injection() {
        let source = ValidatorSource::from(ValidatorFactory::new(|_| Ok(Validator::Key)));
        let err = source
            .resolve(&Resources::new(), &["dbForProject".to_string()])
            .unwrap_err();
        assert!(matches!(err, RestError::MissingResource(name) if name == "dbForProject"));
    }

    #[test]
    fn test_injected_type_mismatch() {
        let resources = Resources::new().with("limit", 5_u32);
        let injected = resources.inject(&["limit".to_string()]).unwrap();
        assert!(injected.get::<u32>("limit").is_ok());
        assert!(matches!(
            injected.get::<String>("limit"),
            Err(RestError::ResourceType { .. })
        ));
    }
}
