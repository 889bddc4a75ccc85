use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use crate::core::{CompoundingFrequency, project};
use crate::store::{Currency, CurrencyStore, HistoryStore, ProjectionRecord};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFrequency {
    Annual,
    Quarterly,
    Monthly,
    Daily,
}

impl From<CliFrequency> for CompoundingFrequency {
    fn from(value: CliFrequency) -> Self {
        match value {
            CliFrequency::Annual => CompoundingFrequency::Annual,
            CliFrequency::Quarterly => CompoundingFrequency::Quarterly,
            CliFrequency::Monthly => CompoundingFrequency::Monthly,
            CliFrequency::Daily => CompoundingFrequency::Daily,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFrequency {
    #[serde(alias = "annually", alias = "yearly")]
    Annual,
    Quarterly,
    Monthly,
    Daily,
}

impl From<ApiFrequency> for CliFrequency {
    fn from(value: ApiFrequency) -> Self {
        match value {
            ApiFrequency::Annual => CliFrequency::Annual,
            ApiFrequency::Quarterly => CliFrequency::Quarterly,
            ApiFrequency::Monthly => CliFrequency::Monthly,
            ApiFrequency::Daily => CliFrequency::Daily,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    principal: Option<f64>,
    rate: Option<f64>,
    years: Option<u32>,
    frequency: Option<ApiFrequency>,
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NotePayload {
    note: String,
}

#[derive(Debug, Deserialize)]
struct CurrencyPayload {
    code: String,
}

#[derive(Parser, Debug)]
#[command(
    name = "compound",
    about = "Compound interest projector with a persisted projection history"
)]
struct Cli {
    #[arg(long, help = "Starting principal")]
    principal: f64,
    #[arg(long, help = "Annual interest rate in percent, e.g. 5 for 5%")]
    rate: f64,
    #[arg(long, help = "Term in whole years; projections cap at 100")]
    years: u32,
    #[arg(long, value_enum, default_value_t = CliFrequency::Annual)]
    frequency: CliFrequency,
}

#[derive(Debug, Clone, Copy)]
struct ProjectionRequest {
    principal: f64,
    rate_percent: f64,
    years: u32,
    frequency: CompoundingFrequency,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CurrencyResponse {
    selected: Currency,
    available: Vec<Currency>,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_request(cli: Cli) -> Result<ProjectionRequest, String> {
    if !cli.principal.is_finite() || cli.principal <= 0.0 {
        return Err("--principal must be a finite number > 0".to_string());
    }

    if !cli.rate.is_finite() || cli.rate <= 0.0 {
        return Err("--rate must be a finite percentage > 0".to_string());
    }

    if cli.years == 0 {
        return Err("--years must be >= 1".to_string());
    }

    Ok(ProjectionRequest {
        principal: cli.principal,
        rate_percent: cli.rate,
        years: cli.years,
        frequency: cli.frequency.into(),
    })
}

fn request_from_payload(payload: &ProjectPayload) -> Result<ProjectionRequest, String> {
    let principal = payload
        .principal
        .ok_or_else(|| "principal is required".to_string())?;
    let rate = payload.rate.ok_or_else(|| "rate is required".to_string())?;
    let years = payload
        .years
        .ok_or_else(|| "years is required".to_string())?;

    build_request(Cli {
        principal,
        rate,
        years,
        frequency: payload
            .frequency
            .map(CliFrequency::from)
            .unwrap_or(CliFrequency::Annual),
    })
}

/// One-shot mode: parse flags, project, print the result as JSON.
pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let request = build_request(cli)?;
    let result = project(
        request.principal,
        request.rate_percent,
        request.years,
        request.frequency,
    );
    let json =
        serde_json::to_string_pretty(&result).map_err(|e| format!("failed to encode result: {e}"))?;
    println!("{json}");
    Ok(())
}

struct AppState {
    history: Mutex<HistoryStore>,
    currency: Mutex<CurrencyStore>,
}

pub async fn run_http_server(port: u16, data_dir: PathBuf) -> std::io::Result<()> {
    let history = HistoryStore::load(data_dir.join("history.json")).map_err(io::Error::other)?;
    let currency = CurrencyStore::load(data_dir.join("currency.json")).map_err(io::Error::other)?;
    let state = Arc::new(AppState {
        history: Mutex::new(history),
        currency: Mutex::new(currency),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route(
            "/api/history",
            get(history_handler).delete(clear_history_handler),
        )
        .route("/api/history/:id/note", post(update_note_handler))
        .route("/api/history/:id", delete(delete_record_handler))
        .route(
            "/api/currency",
            get(currency_handler).put(select_currency_handler),
        )
        .fallback(not_found_handler)
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    println!("Compound HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(
    State(state): State<Arc<AppState>>,
    Query(payload): Query<ProjectPayload>,
) -> Response {
    project_handler_impl(state, payload).await
}

async fn project_post_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProjectPayload>,
) -> Response {
    project_handler_impl(state, payload).await
}

async fn project_handler_impl(state: Arc<AppState>, payload: ProjectPayload) -> Response {
    let request = match request_from_payload(&payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let mut result = project(
        request.principal,
        request.rate_percent,
        request.years,
        request.frequency,
    );
    if let Some(note) = payload.note {
        result.note = note;
    }

    let mut history = state.history.lock().expect("history lock poisoned");
    let record: ProjectionRecord = history.add(result).clone();
    if let Err(e) = history.save() {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
    }
    json_response(StatusCode::OK, record)
}

async fn history_handler(State(state): State<Arc<AppState>>) -> Response {
    let history = state.history.lock().expect("history lock poisoned");
    json_response(StatusCode::OK, history.records().to_vec())
}

async fn update_note_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(payload): Json<NotePayload>,
) -> Response {
    let mut history = state.history.lock().expect("history lock poisoned");
    let record = match history.update_note(id, &payload.note) {
        Ok(record) => record.clone(),
        Err(e) => return error_response(StatusCode::NOT_FOUND, &e.to_string()),
    };
    if let Err(e) = history.save() {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
    }
    json_response(StatusCode::OK, record)
}

async fn delete_record_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Response {
    let mut history = state.history.lock().expect("history lock poisoned");
    if let Err(e) = history.delete(id) {
        return error_response(StatusCode::NOT_FOUND, &e.to_string());
    }
    if let Err(e) = history.save() {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
    }
    json_response(StatusCode::OK, StatusResponse { status: "ok" })
}

async fn clear_history_handler(State(state): State<Arc<AppState>>) -> Response {
    let mut history = state.history.lock().expect("history lock poisoned");
    history.clear();
    if let Err(e) = history.save() {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
    }
    json_response(StatusCode::OK, StatusResponse { status: "ok" })
}

async fn currency_handler(State(state): State<Arc<AppState>>) -> Response {
    let currency = state.currency.lock().expect("currency lock poisoned");
    json_response(
        StatusCode::OK,
        CurrencyResponse {
            selected: currency.selected().clone(),
            available: currency.available().to_vec(),
        },
    )
}

async fn select_currency_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CurrencyPayload>,
) -> Response {
    let mut currency = state.currency.lock().expect("currency lock poisoned");
    if let Err(e) = currency.select(&payload.code) {
        return error_response(StatusCode::BAD_REQUEST, &e.to_string());
    }
    if let Err(e) = currency.save() {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
    }
    json_response(
        StatusCode::OK,
        CurrencyResponse {
            selected: currency.selected().clone(),
            available: currency.available().to_vec(),
        },
    )
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn request_from_json(json: &str) -> Result<ProjectionRequest, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    request_from_payload(&payload)
}
