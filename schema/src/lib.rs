//! Schema-constrained object model with a lenient JSON codec.
//!
//! - [`EntityType`]s are immutable schemas built from [`Property`]
//!   descriptors, defined once and shared by reference.
//! - [`Entity`] instances are mutated through strict assignment
//!   ([`Entity::set`]), which rejects any constraint violation.
//! - The [`codec`] reconstructs entities from JSON without rejecting bad
//!   data; [`problems`] reports everything wrong with an entity tree.
//! - A [`Registry`] classifies documents by their discriminator field.

pub mod classify;
pub mod codec;
pub mod constraint;
pub mod entity;
pub mod offset;
pub mod property;
pub mod validate;
pub mod value;

pub use classify::{ClassifyError, Registry};
pub use codec::{dumps, from_primitive, to_primitive, Codec, CodecError};
pub use constraint::{Constraint, Problem};
pub use entity::{DefinitionError, Dimensions, Entity, EntityError, EntityType};
pub use offset::{OffsetProvider, SystemOffset, TimestampError, ZoneOffset};
pub use property::Property;
pub use validate::{problems, validate_or_raise, ValidationError};
pub use value::{Kind, Value};
