//! The PPMP v2 payload catalogs and the registry that tells them apart.

pub mod common;
pub mod measurement;
pub mod message;
pub mod process;
pub mod series;

use once_cell::sync::Lazy;
use schema::{Codec, CodecError, Entity, OffsetProvider, Registry, SystemOffset};

use crate::constants::content_specs;

pub use common::Device;

/// Every top-level payload type, keyed by `content-spec`.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    [&*measurement::PAYLOAD, &*message::PAYLOAD, &*process::PAYLOAD]
        .into_iter()
        .try_fold(Registry::new(content_specs::KEY), |registry, ty| registry.with(ty))
        .unwrap_or_else(|e| panic!("conflicting PPMP payload types: {e}"))
});

/// Parse a payload; naive timestamps are taken to be in the system offset.
///
/// With `validate` set, a payload with problems is rejected; otherwise it is
/// returned as found and [`problems`](crate::problems) lists what is wrong.
pub fn loads(text: &str, validate: bool) -> Result<Entity, CodecError> {
    loads_with(text, validate, &SystemOffset)
}

pub fn loads_with(
    text: &str,
    validate: bool,
    offsets: &dyn OffsetProvider,
) -> Result<Entity, CodecError> {
    Codec::new(&REGISTRY).with_offsets(offsets).loads(text, validate)
}
