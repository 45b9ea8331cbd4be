//! Payload classifier: picks the top-level entity type of a parsed document
//! from its discriminator field.

use serde_json::{Map, Value as Json};
use thiserror::Error;

use crate::entity::{DefinitionError, EntityType};

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("unknown payload type: {}", describe_found(.key, .found))]
    UnknownPayloadType { key: String, found: Option<String> },
    #[error("payload type '{discriminator}' is ambiguous: {}", .types.join(", "))]
    AmbiguousPayloadType {
        discriminator: String,
        types: Vec<String>,
    },
}

fn describe_found(key: &str, found: &Option<String>) -> String {
    match found {
        Some(value) => format!("no registered type for '{key}' {value}"),
        None => format!("document has no '{key}' field"),
    }
}

/// The set of top-level entity types, keyed by their discriminator.
#[derive(Debug)]
pub struct Registry {
    key: String,
    types: Vec<&'static EntityType>,
}

impl Registry {
    /// An empty registry reading the discriminator from field `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            types: Vec::new(),
        }
    }

    /// Add a top-level type. Types without a discriminator, and a second type
    /// with an already registered discriminator, are rejected.
    pub fn register(&mut self, ty: &'static EntityType) -> Result<(), DefinitionError> {
        let Some(discriminator) = ty.discriminator() else {
            return Err(DefinitionError::MissingDiscriminator {
                entity: ty.name().to_string(),
            });
        };
        if let Some(first) = self
            .types
            .iter()
            .find(|t| t.discriminator() == Some(discriminator))
        {
            return Err(DefinitionError::DuplicateDiscriminator {
                discriminator: discriminator.to_string(),
                first: first.name().to_string(),
                second: ty.name().to_string(),
            });
        }
        self.types.push(ty);
        Ok(())
    }

    pub fn with(mut self, ty: &'static EntityType) -> Result<Self, DefinitionError> {
        self.register(ty)?;
        Ok(self)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn types(&self) -> &[&'static EntityType] {
        &self.types
    }

    /// Exact, case-sensitive match of the discriminator field against every
    /// registered type.
    pub fn classify(&self, document: &Map<String, Json>) -> Result<&'static EntityType, ClassifyError> {
        let discriminator = match document.get(&self.key) {
            Some(Json::String(s)) => s.as_str(),
            other => {
                return Err(ClassifyError::UnknownPayloadType {
                    key: self.key.clone(),
                    found: other.map(Json::to_string),
                })
            }
        };
        let matches: Vec<&'static EntityType> = self
            .types
            .iter()
            .copied()
            .filter(|t| t.discriminator() == Some(discriminator))
            .collect();
        match matches.as_slice() {
            [ty] => Ok(*ty),
            [] => Err(ClassifyError::UnknownPayloadType {
                key: self.key.clone(),
                found: Some(format!("{discriminator:?}")),
            }),
            many => Err(ClassifyError::AmbiguousPayloadType {
                discriminator: discriminator.to_string(),
                types: many.iter().map(|t| t.name().to_string()).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use once_cell::sync::Lazy;
    use serde_json::json;

    use crate::property::Property;

    static ALPHA: Lazy<EntityType> = Lazy::new(|| {
        EntityType::define("Alpha", vec![Property::string("content-spec")], Some("urn:alpha#v1"))
            .unwrap()
    });
    static BETA: Lazy<EntityType> = Lazy::new(|| {
        EntityType::define("Beta", vec![Property::string("content-spec")], Some("urn:beta#v1"))
            .unwrap()
    });
    static ALPHA_TOO: Lazy<EntityType> = Lazy::new(|| {
        EntityType::define("AlphaToo", vec![], Some("urn:alpha#v1")).unwrap()
    });
    static PLAIN: Lazy<EntityType> =
        Lazy::new(|| EntityType::define("Plain", vec![], None).unwrap());

    fn registry() -> Registry {
        Registry::new("content-spec")
            .with(&ALPHA)
            .unwrap()
            .with(&BETA)
            .unwrap()
    }

    fn object(value: Json) -> Map<String, Json> {
        match value {
            Json::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn picks_matching_type() {
        let ty = registry()
            .classify(&object(json!({"content-spec": "urn:beta#v1"})))
            .unwrap();
        assert_eq!(ty.name(), "Beta");
    }

    #[test]
    fn missing_or_unknown_discriminator() {
        let reg = registry();
        for doc in [
            json!({}),
            json!({"content-spec": "urn:gamma#v1"}),
            json!({"content-spec": "URN:ALPHA#V1"}),
            json!({"content-spec": 7}),
        ] {
            assert!(matches!(
                reg.classify(&object(doc)),
                Err(ClassifyError::UnknownPayloadType { .. })
            ));
        }
        let err = reg.classify(&object(json!({}))).unwrap_err();
        assert_eq!(err.to_string(), "unknown payload type: document has no 'content-spec' field");
    }

    #[test]
    fn duplicate_discriminator_rejected_at_registration() {
        let err = registry().with(&ALPHA_TOO).unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateDiscriminator { .. }));
        assert!(matches!(
            registry().with(&PLAIN).unwrap_err(),
            DefinitionError::MissingDiscriminator { .. }
        ));
    }

    #[test]
    fn ambiguity_is_reported() {
        let reg = Registry {
            key: "content-spec".into(),
            types: vec![&*ALPHA, &*ALPHA_TOO],
        };
        let err = reg
            .classify(&object(json!({"content-spec": "urn:alpha#v1"})))
            .unwrap_err();
        assert!(matches!(err, ClassifyError::AmbiguousPayloadType { ref types, .. } if types.len() == 2));
    }
}
