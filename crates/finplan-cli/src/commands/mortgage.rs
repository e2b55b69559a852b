use clap::Args;
use serde_json::Value;

use finplan_core::mortgage::{self, MortgageInput};

use crate::input;

#[derive(Args)]
pub struct MortgageArgs {
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_mortgage(args: MortgageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cfg: MortgageInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for mortgage".into());
    };
    let result = mortgage::simulate_mortgage(&cfg)?;
    Ok(serde_json::to_value(result)?)
}
