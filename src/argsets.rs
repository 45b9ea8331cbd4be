use ppmp::message::{MessageType, Severity};

pub struct ValidateArgs {
    pub input: String,
    pub json: bool,
}

pub struct FormatArgs {
    pub input: String,
    pub compact: bool,
}

pub struct MeasureArgs {
    pub device_id: String,
    pub samples: Vec<String>,
}

pub struct MessageArgs {
    pub device_id: String,
    pub code: String,
    pub severity: Option<Severity>,
    pub message_type: Option<MessageType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub hint: Option<String>,
}
