use anyhow::{anyhow, Result};
use ppmp::Problem;
use serde::Serialize;

use super::read_input;
use crate::argsets::ValidateArgs;

#[derive(Serialize)]
struct Report<'a> {
    payload: &'a str,
    valid: bool,
    problems: &'a [Problem],
}

pub fn validate(args: ValidateArgs) -> Result<()> {
    let text = read_input(&args.input)?;
    let offsets = ppmp::offsets::configured()?;
    let payload = ppmp::loads_with(&text, false, offsets.as_ref())?;
    let problems = payload.problems();

    if args.json {
        let report = Report {
            payload: payload.type_name(),
            valid: problems.is_empty(),
            problems: &problems,
        };
        println!("{}", serde_json::to_string(&report)?);
    } else {
        for problem in &problems {
            println!("{problem}");
        }
    }

    if !problems.is_empty() {
        return Err(anyhow!(
            "{} problem(s) found in {}",
            problems.len(),
            payload.type_name()
        ));
    }
    log::info!("{} is a valid {}", args.input, payload.type_name());
    Ok(())
}
