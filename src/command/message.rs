use anyhow::Result;
use ppmp::Device;

use crate::argsets::MessageArgs;

pub fn message(args: MessageArgs) -> Result<()> {
    let device = Device::new(&args.device_id)?;
    let mut builder = device.message(&args.code);
    if let Some(severity) = args.severity {
        builder = builder.severity(severity);
    }
    if let Some(message_type) = args.message_type {
        builder = builder.message_type(message_type);
    }
    if let Some(title) = &args.title {
        builder = builder.title(title);
    }
    if let Some(description) = &args.description {
        builder = builder.description(description);
    }
    if let Some(hint) = &args.hint {
        builder = builder.hint(hint);
    }
    let payload = builder.build()?;
    println!("{}", ppmp::dumps(&payload, false)?);
    Ok(())
}
