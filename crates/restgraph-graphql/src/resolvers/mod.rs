//! GraphQL resolvers.
//!
//! Every field resolver is a thin adapter around exactly one backend call.
//! [`settle`] runs that call and turns its outcome into the engine's field
//! result: a value on success, or an error scoped to the one field on failure
//! (including a panic inside the call).

mod create;
mod delete;
mod read;
mod route;
mod update;

pub use create::CreateResolver;
pub use delete::DeleteResolver;
pub use read::{GetResolver, ListResolver};
pub use route::RouteResolver;
pub use update::UpdateResolver;

use std::future::Future;
use std::panic::AssertUnwindSafe;

use async_graphql::Value;
use async_graphql::dynamic::ResolverContext;
use futures_util::FutureExt;
use indexmap::IndexMap;
use serde_json::Map;
use tracing::{debug, error};

use crate::error::ResolverError;

/// Runs one backend call for `field` and settles its result exactly once.
///
/// `Ok(None)` and a JSON `null` both resolve to a null field value.
pub(crate) async fn settle<F>(
    field: &str,
    call: F,
) -> Result<Option<Value>, async_graphql::Error>
where
    F: Future<Output = Result<Option<serde_json::Value>, ResolverError>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(Some(serde_json::Value::Null) | None)) => Ok(None),
        Ok(Ok(Some(value))) => Ok(Some(json_to_graphql_value(value))),
        Ok(Err(err)) => {
            debug!(field = %field, code = err.code, error = %err, "Field resolution rejected");
            Err(err.into_graphql())
        }
        Err(panic) => {
            let err = ResolverError::from_panic(panic);
            error!(field = %field, error = %err, "Resolver panicked");
            Err(err.into_graphql())
        }
    }
}

/// Converts the field's arguments to a JSON object keyed by argument name.
pub(crate) fn arguments_to_json(ctx: &ResolverContext<'_>) -> Map<String, serde_json::Value> {
    ctx.args
        .iter()
        .map(|(name, value)| (name.to_string(), graphql_value_to_json(value.as_value())))
        .collect()
}

/// Rewrites escaped argument names back to the record keys they stand for.
///
/// Names missing from `keys` are kept as is.
pub(crate) fn to_record(
    arguments: Map<String, serde_json::Value>,
    keys: &IndexMap<String, String>,
) -> Map<String, serde_json::Value> {
    arguments
        .into_iter()
        .map(|(name, value)| match keys.get(&name) {
            Some(source_key) => (source_key.clone(), value),
            None => (name, value),
        })
        .collect()
}

/// Reads a string argument.
pub(crate) fn string_argument(ctx: &ResolverContext<'_>, name: &str) -> Option<String> {
    ctx.args
        .get(name)
        .and_then(|value| value.string().ok().map(str::to_string))
}

/// Reads a required string argument.
#[track_caller]
pub(crate) fn required_string_argument(
    ctx: &ResolverContext<'_>,
    name: &str,
) -> Result<String, ResolverError> {
    string_argument(ctx, name)
        .ok_or_else(|| ResolverError::new(format!("Missing required argument '{name}'"), 400))
}

/// Reads the `id` addressing a document; numeric ids are accepted as their
/// decimal text.
#[track_caller]
pub(crate) fn document_id_argument(ctx: &ResolverContext<'_>) -> Result<String, ResolverError> {
    match ctx.args.get("id").map(|value| value.as_value()) {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(ResolverError::new("Missing required argument 'id'", 400)),
    }
}

/// Converts JSON to a GraphQL value.
pub(crate) fn json_to_graphql_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                async_graphql::Number::from_f64(f).map_or(Value::Null, Value::Number)
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_to_graphql_value).collect())
        }
        serde_json::Value::Object(obj) => Value::Object(
            obj.into_iter()
                .map(|(k, v)| (async_graphql::Name::new(k), json_to_graphql_value(v)))
                .collect(),
        ),
    }
}

/// Converts a GraphQL value to JSON.
pub(crate) fn graphql_value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::Number(i.into())
            } else if let Some(f) = n.as_f64() {
                serde_json::json!(f)
            } else {
                serde_json::Value::Null
            }
        }
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::List(arr) => serde_json::Value::Array(arr.iter().map(graphql_value_to_json).collect()),
        Value::Object(obj) => serde_json::Value::Object(
            obj.iter()
                .map(|(k, v)| (k.to_string(), graphql_value_to_json(v)))
                .collect(),
        ),
        Value::Enum(e) => serde_json::Value::String(e.to_string()),
        Value::Binary(b) => serde_json::Value::Array(b.iter().map(|byte| (*byte).into()).collect()),
    }
}
