use anyhow::Result;

use super::read_input;
use crate::argsets::FormatArgs;

pub fn format(args: FormatArgs) -> Result<()> {
    let text = read_input(&args.input)?;
    let offsets = ppmp::offsets::configured()?;
    let payload = ppmp::loads_with(&text, false, offsets.as_ref())?;
    let problems = payload.problems();
    if !problems.is_empty() {
        log::warn!(
            "{} has {} problem(s); formatting anyway",
            payload.type_name(),
            problems.len()
        );
    }
    println!("{}", ppmp::dumps(&payload, !args.compact)?);
    Ok(())
}
