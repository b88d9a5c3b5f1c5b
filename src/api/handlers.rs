//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{BiQuery, BiRecord, ErrorResponse, RegimeEntry, SwitchingResponse};
use crate::bi::MetricCategory;
use crate::market::summary::SummaryRow;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Returns the summary row of every scenario.
///
/// `GET /summary` → 200 + `Vec<SummaryRow>` JSON
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<Vec<SummaryRow>> {
    Json(state.outcome.summary.clone())
}

/// Returns the full dispatch result of one scenario.
///
/// `GET /scenarios/{name}` → 200 + `DispatchResult` JSON
/// `GET /scenarios/unknown` → 404 + `ErrorResponse`
pub async fn get_scenario(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.outcome.result(&name) {
        Some(result) => Ok(Json(result.clone())),
        None => Err(api_error(
            StatusCode::NOT_FOUND,
            format!(
                "unknown scenario \"{name}\" in case \"{}\"",
                state.case_name
            ),
        )),
    }
}

/// Returns the switching price and every scenario's regime.
///
/// `GET /switching` → 200 + `SwitchingResponse` JSON
/// → 422 + `ErrorResponse` when the roster cannot support the calculation
pub async fn get_switching(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.outcome.switching {
        Ok(sp) => Ok(Json(SwitchingResponse {
            switching: sp.clone(),
            regimes: state
                .outcome
                .summary
                .iter()
                .map(|row| RegimeEntry::new(row, sp))
                .collect(),
        })),
        Err(e) => Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())),
    }
}

/// Returns the long-format BI table.
///
/// `GET /bi-export` → 200 + `Vec<BiRecord>` JSON
/// `GET /bi-export?data_type=Economic` → rows of one category
/// `GET /bi-export?data_type=Monetary` → 400 + `ErrorResponse`
pub async fn get_bi_export(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BiQuery>,
) -> impl IntoResponse {
    let category = match query.data_type.as_deref().map(str::parse::<MetricCategory>) {
        None => None,
        Some(Ok(c)) => Some(c),
        Some(Err(e)) => return Err(api_error(StatusCode::BAD_REQUEST, e)),
    };

    let table = state.outcome.bi_export();
    let records: Vec<BiRecord> = table
        .rows
        .iter()
        .filter(|r| category.is_none_or(|c| r.data_type == c))
        .map(|r| BiRecord::new(&table, r))
        .collect();

    Ok(Json(records))
}
