pub mod content_specs;
pub mod defaults;
pub mod envvars;
