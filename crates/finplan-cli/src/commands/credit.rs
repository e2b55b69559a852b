use clap::Args;
use serde_json::Value;

use finplan_core::amortization::{self, LoanInput};

use crate::input;

#[derive(Args)]
pub struct AmortizeArgs {
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan: LoanInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for amortize".into());
    };
    let result = amortization::amortize(&loan)?;
    Ok(serde_json::to_value(result)?)
}
