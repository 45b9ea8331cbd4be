//! Machine messages: a device's or integrator's interpretation of
//! measurement data or status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use schema::{Entity, EntityError, EntityType, Kind, Property, Value};
use thiserror::Error;

use super::common::{self, define, Device};
use crate::constants::content_specs;
use crate::offsets;

#[derive(Error, Debug)]
#[error("{value:?} is not one of {}", .allowed.join(", "))]
pub struct UnknownVariant {
    value: String,
    allowed: &'static [&'static str],
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MessageType {
    #[default]
    Device,
    TechnicalInfo,
}

impl MessageType {
    pub const NAMES: &'static [&'static str] = &["DEVICE", "TECHNICAL_INFO"];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Device => "DEVICE",
            MessageType::TechnicalInfo => "TECHNICAL_INFO",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    High,
    Medium,
    Low,
    Unknown,
}

impl Severity {
    pub const NAMES: &'static [&'static str] = &["HIGH", "MEDIUM", "LOW", "UNKNOWN"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for MessageType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEVICE" => Ok(MessageType::Device),
            "TECHNICAL_INFO" => Ok(MessageType::TechnicalInfo),
            _ => Err(UnknownVariant {
                value: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Severity::High),
            "MEDIUM" => Ok(Severity::Medium),
            "LOW" => Ok(Severity::Low),
            "UNKNOWN" => Ok(Severity::Unknown),
            _ => Err(UnknownVariant {
                value: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub static MESSAGE: Lazy<EntityType> = Lazy::new(|| {
    define(
        "Message",
        vec![
            Property::timestamp("ts"),
            Property::string("origin"),
            Property::string("type").one_of(MessageType::NAMES.iter().copied()),
            Property::string("severity").one_of(Severity::NAMES.iter().copied()),
            common::code().required(),
            Property::string("title").max_length(1000),
            Property::string("description").max_length(2000),
            Property::string("hint").max_length(2000),
            common::meta_data(),
        ],
        None,
    )
});

pub static PAYLOAD: Lazy<EntityType> = Lazy::new(|| {
    define(
        "MessagePayload",
        vec![
            common::content_spec(content_specs::MESSAGE),
            Property::entity("device", &common::DEVICE).required(),
            Property::sequence_of("messages", Kind::Entity(&MESSAGE))
                .default_value(Value::Sequence(vec![])),
        ],
        Some(content_specs::MESSAGE),
    )
});

pub fn new_payload(device: Device) -> Result<Entity, EntityError> {
    Entity::from_values(&PAYLOAD, [("device", Value::from(device))])
}

pub fn new_message(code: &str) -> Result<Entity, EntityError> {
    Entity::from_values(&MESSAGE, [("code", code)])
}

/// Collects the fields of one message; see [`Device::message`].
#[derive(Debug)]
pub struct MessageBuilder<'a> {
    device: &'a Device,
    code: String,
    ts: Option<DateTime<FixedOffset>>,
    fields: Vec<(&'static str, String)>,
    meta: Vec<(String, String)>,
}

impl MessageBuilder<'_> {
    pub fn ts(mut self, ts: DateTime<FixedOffset>) -> Self {
        self.ts = Some(ts);
        self
    }

    pub fn origin(self, origin: &str) -> Self {
        self.field("origin", origin)
    }

    pub fn message_type(self, message_type: MessageType) -> Self {
        self.field("type", message_type.as_str())
    }

    pub fn severity(self, severity: Severity) -> Self {
        self.field("severity", severity.as_str())
    }

    pub fn title(self, title: &str) -> Self {
        self.field("title", title)
    }

    pub fn description(self, description: &str) -> Self {
        self.field("description", description)
    }

    pub fn hint(self, hint: &str) -> Self {
        self.field("hint", hint)
    }

    pub fn meta(mut self, key: &str, value: &str) -> Self {
        self.meta.push((key.to_string(), value.to_string()));
        self
    }

    /// A message payload from the device holding this one message.
    ///
    /// Every field is checked here; the first violation is returned.
    pub fn build(self) -> Result<Entity, EntityError> {
        let mut message = new_message(&self.code)?;
        message.set("ts", self.ts.unwrap_or_else(offsets::local_now))?;
        for (name, value) in self.fields {
            message.set(name, value)?;
        }
        for (key, value) in &self.meta {
            common::insert_meta(&mut message, key, value)?;
        }

        let mut payload = new_payload(self.device.clone())?;
        payload.push("messages", message)?;
        Ok(payload)
    }

    fn field(mut self, name: &'static str, value: &str) -> Self {
        self.fields.retain(|(n, _)| *n != name);
        self.fields.push((name, value.to_string()));
        self
    }
}

impl Device {
    /// Start a time-stamped message with the given code.
    ///
    /// ```
    /// use ppmp::message::Severity;
    /// use ppmp::Device;
    ///
    /// let device = Device::new("2ca5158b-8350-4592-bff9-755194497d4e").unwrap();
    /// let payload = device
    ///     .message("190ABT")
    ///     .severity(Severity::High)
    ///     .title("Coolant low")
    ///     .build()
    ///     .unwrap();
    /// assert!(payload.problems().is_empty());
    /// ```
    pub fn message(&self, code: &str) -> MessageBuilder<'_> {
        MessageBuilder {
            device: self,
            code: code.to_string(),
            ts: None,
            fields: Vec::new(),
            meta: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    use crate::{dumps, loads};

    const MINIMAL: &str = r#"{
      "content-spec":"urn:spec://eclipse.org/unide/machine-message#v2",
      "device": {
        "deviceID": "2ca5158b-8350-4592-bff9-755194497d4e"
      },
      "messages": [{
        "ts": "2002-05-30T09:30:10.123+02:00",
        "code": "190ABT"
      }]
    }"#;

    fn ts() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2002, 5, 30, 9, 30, 10)
            .unwrap()
            + chrono::Duration::milliseconds(123)
    }

    #[test]
    fn create_message_payload() {
        let device = Device::new("29038409").unwrap();
        let mut payload = new_payload(device).unwrap();
        assert_eq!(payload.get("messages").unwrap(), &Value::Sequence(vec![]));

        let mut message = new_message("190AB").unwrap();
        common::insert_meta(&mut message, "nonsense", "no sense").unwrap();
        payload.push("messages", message).unwrap();

        let messages = payload.get("messages").unwrap().as_sequence().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].as_entity().unwrap().get("code").unwrap().as_str(), Some("190AB"));

        let clone = loads(&dumps(&payload, false).unwrap(), true).unwrap();
        assert_eq!(payload, clone);
    }

    #[test]
    fn unrecognised_message_key_cannot_be_pushed() {
        let mut payload = new_payload(Device::new("29038409").unwrap()).unwrap();
        let mut message = new_message("190AB").unwrap();
        message.set_lenient("nonsense", Value::from("no sense"));
        assert!(payload.push("messages", message).is_err());
        assert_eq!(payload.get("messages").unwrap(), &Value::Sequence(vec![]));
    }

    #[test]
    fn code_is_mandatory() {
        let mut message = new_message("190AB").unwrap();
        assert!(message.set("code", Value::Null).is_err());
        assert!(new_message(&"x".repeat(37)).is_err());
    }

    #[test]
    fn load_minimal() {
        let payload = loads(MINIMAL, true).unwrap();
        assert_eq!(payload.type_name(), "MessagePayload");

        let messages = payload.get("messages").unwrap().as_sequence().unwrap();
        assert_eq!(messages.len(), 1);

        let expected = Entity::from_values(
            &MESSAGE,
            [("ts", Value::from(ts())), ("code", Value::from("190ABT"))],
        )
        .unwrap();
        assert_eq!(messages[0], Value::from(expected));
    }

    #[test]
    fn builder_fills_every_field() {
        let device = Device::new("2ca5158b").unwrap();
        let payload = device
            .message("E-42")
            .ts(ts())
            .origin("sensor/right")
            .message_type(MessageType::TechnicalInfo)
            .severity(Severity::Low)
            .title("Calibration drift")
            .description("Offset exceeds tolerance")
            .hint("Recalibrate")
            .meta("firmware", "1.2.3")
            .build()
            .unwrap();
        assert!(payload.problems().is_empty());

        let text = dumps(&payload, false).unwrap();
        assert_eq!(
            text,
            concat!(
                r#"{"content-spec":"urn:spec://eclipse.org/unide/machine-message#v2","#,
                r#""device":{"deviceID":"2ca5158b"},"#,
                r#""messages":[{"ts":"2002-05-30T09:30:10.123+02:00","origin":"sensor/right","#,
                r#""type":"TECHNICAL_INFO","severity":"LOW","code":"E-42","#,
                r#""title":"Calibration drift","description":"Offset exceeds tolerance","#,
                r#""hint":"Recalibrate","metaData":{"firmware":"1.2.3"}}]}"#
            )
        );
    }

    #[test]
    fn builder_rejects_long_title() {
        let device = Device::new("1").unwrap();
        let err = device.message("C").title(&"t".repeat(1001)).build().unwrap_err();
        assert!(matches!(err, EntityError::Constraint { ref property, .. } if property == "title"));
    }

    #[test]
    fn builder_defaults_to_now() {
        let device = Device::new("1").unwrap();
        let payload = device.message("C").build().unwrap();
        let messages = payload.get("messages").unwrap().as_sequence().unwrap();
        assert!(messages[0].as_entity().unwrap().get("ts").unwrap().as_timestamp().is_some());
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("high".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!("technical_info".parse::<MessageType>().unwrap(), MessageType::TechnicalInfo);
        let err = "urgent".parse::<Severity>().unwrap_err();
        assert_eq!(err.to_string(), r#""urgent" is not one of HIGH, MEDIUM, LOW, UNKNOWN"#);
    }
}
