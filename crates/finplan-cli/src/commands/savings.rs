use clap::Args;
use serde_json::Value;

use finplan_core::projection::{self, ScenarioInput};
use finplan_core::savings::{self, SavingsInput};
use finplan_core::target::{self, TargetInput};

use crate::input;

#[derive(Args)]
pub struct ScenariosArgs {
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct TargetArgs {
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct SavingsArgs {
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_scenarios(args: ScenariosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cfg: ScenarioInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for scenarios".into());
    };
    let result = projection::project_scenarios(&cfg)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_target(args: TargetArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cfg: TargetInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for target".into());
    };
    let result = target::solve_target(&cfg)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_savings(args: SavingsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cfg: SavingsInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for savings".into());
    };
    let result = savings::project_savings(&cfg)?;
    Ok(serde_json::to_value(result)?)
}
