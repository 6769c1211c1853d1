//! Mapping of route parameter validators to GraphQL argument types.

use restgraph_rest::{Resources, Validator, ValidatorSource};
use tracing::trace;

use super::types::GraphType;
use crate::error::GraphQLError;

/// Classifies a resolved validator.
///
/// List validators recurse into their element validator; anything the table
/// does not know about is exposed as JSON.
#[must_use]
pub fn validator_type(validator: &Validator) -> GraphType {
    if let Some(element) = validator.inner() {
        return validator_type(element).list();
    }
    match validator {
        Validator::Text { .. }
        | Validator::Length { .. }
        | Validator::WhiteList { .. }
        | Validator::Password
        | Validator::Email
        | Validator::Url
        | Validator::Host { .. }
        | Validator::Ip
        | Validator::Domain
        | Validator::CName
        | Validator::Origin
        | Validator::Cron
        | Validator::Key
        | Validator::Uid
        | Validator::CustomId
        | Validator::HexColor
        | Validator::File => GraphType::String,
        Validator::Boolean => GraphType::Boolean,
        Validator::Numeric | Validator::Integer | Validator::Range { .. } => GraphType::Int,
        Validator::FloatValue => GraphType::Float,
        Validator::Permissions | Validator::Roles => GraphType::String.list(),
        Validator::Assoc
        | Validator::Json
        | Validator::Custom { .. }
        | Validator::ArrayList { .. } => GraphType::Json,
    }
}

/// Resolves a parameter's validator and maps it to an argument type.
///
/// # Errors
///
/// Returns `GraphQLError::MissingResource` if the validator factory needs a
/// resource that is not registered, or the factory's own error.
pub fn map_validator(
    source: &ValidatorSource,
    required: bool,
    resources: &Resources,
    injections: &[String],
) -> Result<GraphType, GraphQLError> {
    let validator = source.resolve(resources, injections)?;
    let ty = validator_type(&validator);
    trace!(validator = validator.kind(), graphql_type = %ty, "Mapped validator");

    Ok(if required { ty.required() } else { ty })
}

#[cfg(test)]
mod tests {
    use super::*;
    use restgraph_rest::ValidatorFactory;

    #[test]
    fn test_string_validators() {
        for validator in [
            Validator::Email,
            Validator::Url,
            Validator::Uid,
            Validator::HexColor,
            Validator::WhiteList {
                values: vec!["a".into()],
            },
        ] {
            assert_eq!(validator_type(&validator), GraphType::String);
        }
    }

    #[test]
    fn test_numeric_and_boolean_validators() {
        assert_eq!(validator_type(&Validator::Boolean), GraphType::Boolean);
        assert_eq!(
            validator_type(&Validator::Range { min: 0, max: 10 }),
            GraphType::Int
        );
        assert_eq!(validator_type(&Validator::FloatValue), GraphType::Float);
    }

    #[test]
    fn test_permission_validators_are_string_lists() {
        assert_eq!(
            validator_type(&Validator::Permissions),
            GraphType::String.list()
        );
    }

    #[test]
    fn test_unknown_validators_are_json() {
        assert_eq!(validator_type(&Validator::Assoc), GraphType::Json);
        assert_eq!(
            validator_type(&Validator::Custom {
                name: "Query".into()
            }),
            GraphType::Json
        );
    }

    #[test]
    fn test_required_list_of_integers() {
        let source = ValidatorSource::from(Validator::array_list(Validator::Integer));
        let ty = map_validator(&source, true, &Resources::new(), &[]).unwrap();
        assert_eq!(ty, GraphType::Int.list().required());
        assert_eq!(ty.to_string(), "[Int]!");
    }

    #[test]
    fn test_nested_lists() {
        let validator = Validator::array_list(Validator::array_list(Validator::Email));
        assert_eq!(validator_type(&validator).to_string(), "[[String]]");
    }

    #[test]
    fn test_factory_with_injection() {
        let resources = Resources::new().with("maxLength", 64_usize);
        let source = ValidatorSource::from(ValidatorFactory::new(|injected| {
            let max_length = *injected.get::<usize>("maxLength")?;
            Ok(Validator::Text { max_length })
        }));

        let ty = map_validator(&source, false, &resources, &["maxLength".to_string()]).unwrap();
        assert_eq!(ty, GraphType::String);
    }

    #[test]
    fn test_factory_missing_resource_is_an_error() {
        let source = ValidatorSource::from(ValidatorFactory::new(|_| Ok(Validator::Uid)));
        let err = map_validator(&source, false, &Resources::new(), &["db".to_string()])
            .unwrap_err();
        assert!(matches!(err, GraphQLError::MissingResource(name) if name == "db"));
    }
}
