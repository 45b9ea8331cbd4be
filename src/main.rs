mod argsets;
mod command;
mod helpers;

use std::ffi::OsString;

use anyhow::{anyhow, Result};
use env_logger::Env;
use ppmp::constants::{defaults, envvars};

const CMD_VALIDATE: &str = "validate";
const CMD_FORMAT: &str = "format";
const CMD_MEASURE: &str = "measure";
const CMD_MESSAGE: &str = "message";

fn main() -> Result<()> {
    helpers::load_dotenv();
    env_logger::Builder::from_env(
        Env::default().filter_or(envvars::LOGGING_LEVEL, defaults::LOGGING_LEVEL),
    )
    .init();

    let mut args = pico_args::Arguments::from_env();
    match args.subcommand()?.as_deref() {
        Some(CMD_VALIDATE) => command::validate(argsets::ValidateArgs {
            json: args.contains("--json"),
            input: args.free_from_str()?,
        }),
        Some(CMD_FORMAT) => command::format(argsets::FormatArgs {
            compact: args.contains("--compact"),
            input: args.free_from_str()?,
        }),
        Some(CMD_MEASURE) => command::measure(argsets::MeasureArgs {
            device_id: args.free_from_str()?,
            samples: remaining(args)?,
        }),
        Some(CMD_MESSAGE) => command::message(argsets::MessageArgs {
            severity: args.opt_value_from_str("--severity")?,
            message_type: args.opt_value_from_str("--type")?,
            title: args.opt_value_from_str("--title")?,
            description: args.opt_value_from_str("--description")?,
            hint: args.opt_value_from_str("--hint")?,
            device_id: args.free_from_str()?,
            code: args.free_from_str()?,
        }),
        _ => Err(anyhow!(
            "Subcommand must be one of 'validate', 'format', 'measure', 'message'"
        )),
    }
}

fn remaining(args: pico_args::Arguments) -> Result<Vec<String>> {
    args.finish()
        .into_iter()
        .map(|arg: OsString| {
            arg.into_string()
                .map_err(|arg| anyhow!("Argument is not valid UTF-8: {arg:?}"))
        })
        .collect()
}
