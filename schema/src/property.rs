use crate::constraint::{Constraint, Problem};
use crate::entity::EntityType;
use crate::value::{Kind, Value};

/// Declarative description of one named property of an [`EntityType`].
///
/// Built with the constructor matching the property's kind, then refined:
///
/// ```
/// use schema::Property;
///
/// let id = Property::string("deviceID").max_length(36).required();
/// assert!(id.is_required());
/// ```
#[derive(Clone, Debug)]
pub struct Property {
    name: String,
    required: bool,
    constraints: Vec<Constraint>,
    default: Option<Value>,
}

impl Property {
    /// A property of the given kind; container kinds also check their
    /// elements, entity kinds validate the nested entity.
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        let mut constraints = vec![Constraint::Type(kind.clone())];
        match &kind {
            Kind::Entity(ty) => constraints.push(Constraint::Nested(*ty)),
            Kind::Sequence(inner) => constraints.push(Constraint::SequenceOf((**inner).clone())),
            Kind::Map(inner) => constraints.push(Constraint::MapOf((**inner).clone())),
            _ => {}
        }
        Self {
            name: name.into(),
            required: false,
            constraints,
            default: None,
        }
    }

    /// An untyped property: any present value passes the type check.
    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Any)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, Kind::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Boolean)
    }

    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::new(name, Kind::Timestamp)
    }

    pub fn entity(name: impl Into<String>, ty: &'static EntityType) -> Self {
        Self::new(name, Kind::Entity(ty))
    }

    pub fn sequence_of(name: impl Into<String>, element: Kind) -> Self {
        Self::new(name, Kind::sequence_of(element))
    }

    pub fn map_of(name: impl Into<String>, value: Kind) -> Self {
        Self::new(name, Kind::map_of(value))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_length(self, max: usize) -> Self {
        self.constraint(Constraint::MaxLength(max))
    }

    pub fn range(self, min: Option<f64>, max: Option<f64>) -> Self {
        self.constraint(Constraint::Range { min, max })
    }

    pub fn one_of<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.constraint(Constraint::one_of(values))
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Value applied when an entity is created without this property.
    /// Defaults are trusted and not re-validated.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// The declared kind: the first type constraint, or `Any` if none.
    pub fn kind(&self) -> &Kind {
        self.constraints
            .iter()
            .find_map(|c| match c {
                Constraint::Type(kind) => Some(kind),
                _ => None,
            })
            .unwrap_or(&Kind::Any)
    }

    /// All findings for `value` stored under this property at `path`.
    ///
    /// Once the type check fails, the remaining constraints are skipped.
    pub fn check(&self, path: &str, value: &Value) -> Vec<Problem> {
        if value.is_absent() {
            if self.required {
                return vec![Problem::new(path, "required property is not set")];
            }
            return vec![];
        }
        let mut problems = Vec::new();
        for constraint in &self.constraints {
            if let Err(found) = constraint.check(path, value) {
                problems.extend(found);
                if matches!(constraint, Constraint::Type(_)) {
                    break;
                }
            }
        }
        problems
    }

    /// First violated constraint, as used by strict assignment.
    pub(crate) fn first_violation(&self, path: &str, value: &Value) -> Option<(String, Vec<Problem>)> {
        if value.is_absent() {
            return self
                .required
                .then(|| ("required".to_string(), vec![Problem::new(path, "may not be unset")]));
        }
        self.constraints.iter().find_map(|constraint| {
            constraint
                .check(path, value)
                .err()
                .map(|problems| (constraint.describe(), problems))
        })
    }
}
