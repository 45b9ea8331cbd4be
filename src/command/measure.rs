use anyhow::{anyhow, Context, Result};
use ppmp::constants::defaults;
use ppmp::Device;

use crate::argsets::MeasureArgs;

pub fn measure(args: MeasureArgs) -> Result<()> {
    if args.samples.is_empty() {
        return Err(anyhow!("At least one <name>=<value> sample is required"));
    }
    let samples = args
        .samples
        .iter()
        .map(String::as_str)
        .map(parse_sample)
        .collect::<Result<Vec<_>>>()?;
    let values: Vec<(&str, f64)> = samples.iter().map(|(n, v)| (n.as_str(), *v)).collect();

    let device = Device::new(&args.device_id)?;
    let payload = device.measurement(None, &values)?;
    log::debug!("Built measurement of {} value(s)", values.len());
    println!("{}", ppmp::dumps(&payload, false)?);
    Ok(())
}

fn parse_sample(arg: &str) -> Result<(String, f64)> {
    let (name, value) = arg
        .split_once(defaults::SAMPLE_SEPARATOR)
        .ok_or_else(|| anyhow!("Expected <name>=<value>, got '{arg}'"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Value of '{name}' is not a number: '{value}'"))?;
    Ok((name.trim().to_string(), value))
}
