// Payload discriminator and the URNs it takes
pub const KEY: &str = "content-spec";

pub const MEASUREMENT: &str = "urn:spec://eclipse.org/unide/measurement-message#v2";
pub const MESSAGE: &str = "urn:spec://eclipse.org/unide/machine-message#v2";
pub const PROCESS: &str = "urn:spec://eclipse.org/unide/process-message#v2";
