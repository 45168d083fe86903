use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Financing
// ---------------------------------------------------------------------------

/// Accepts either `{"ByTerm": {...}}` or `{"ByBudget": {...}}`.
#[napi]
pub fn simulate_financing(input_json: String) -> NapiResult<String> {
    let input: simfin_core::financing::FinancingRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = simfin_core::financing::simulate_financing(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Consortium
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_consortium(input_json: String) -> NapiResult<String> {
    let input: simfin_core::consortium::ConsortiumInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = simfin_core::consortium::simulate_consortium(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_alternatives(input_json: String) -> NapiResult<String> {
    let input: simfin_core::comparison::ComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = simfin_core::comparison::compare_alternatives(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

/// Monthly equivalent of an annual rate, both as decimal strings.
#[napi]
pub fn monthly_equivalent_rate(annual_rate: String) -> NapiResult<String> {
    let annual: rust_decimal::Decimal = annual_rate.parse().map_err(to_napi_error)?;
    Ok(simfin_core::rates::monthly_equivalent(annual).to_string())
}
