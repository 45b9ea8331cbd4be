mod format;
mod measure;
mod message;
mod validate;

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};

pub use format::format;
pub use measure::measure;
pub use message::message;
pub use validate::validate;

const STDIN: &str = "-";

fn read_input(input: &str) -> Result<String> {
    if input == STDIN {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Cannot read payload from stdin")?;
        return Ok(text);
    }
    fs::read_to_string(input).with_context(|| format!("Cannot read payload from {input}"))
}
