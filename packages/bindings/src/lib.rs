use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[napi]
pub fn amortize_loan(input_json: String) -> NapiResult<String> {
    let input: finplan_core::amortization::LoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::amortization::amortize(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_scenarios(input_json: String) -> NapiResult<String> {
    let input: finplan_core::projection::ScenarioInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::projection::project_scenarios(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn solve_target(input_json: String) -> NapiResult<String> {
    let input: finplan_core::target::TargetInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::target::solve_target(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate_mortgage(input_json: String) -> NapiResult<String> {
    let input: finplan_core::mortgage::MortgageInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::mortgage::simulate_mortgage(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_savings(input_json: String) -> NapiResult<String> {
    let input: finplan_core::savings::SavingsInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::savings::project_savings(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
