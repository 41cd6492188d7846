use crate::config::AppConfig;
use crate::data::ReferenceDataset;
use crate::geocode::Geocoder;
use crate::resolve::{self, Resolution};
use crate::solar::{self, SolarEstimate};
use crate::types::{GeoPoint, ResolveError};
use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub dataset: ReferenceDataset,
    pub geocoder: Geocoder,
    pub config: AppConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub area_hectares: f64,
    #[serde(default = "default_land_use")]
    pub land_use_type: String,
}

fn default_land_use() -> String {
    "reforestation".to_string()
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum CalculateResponse {
    #[serde(rename_all = "camelCase")]
    Reforestation {
        land_use_type: &'static str,
        area_hectares: f64,
        #[serde(flatten)]
        resolution: Resolution,
    },
    #[serde(rename_all = "camelCase")]
    Solar {
        land_use_type: &'static str,
        area_hectares: f64,
        #[serde(flatten)]
        estimate: SolarEstimate,
    },
}

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn location_not_found() -> ApiError {
    ApiError::NotFound("could not determine region for this location".to_string())
}

pub async fn start_server(config: AppConfig, dataset: ReferenceDataset) -> Result<()> {
    let geocoder = Geocoder::new(&config.geocoder)?;
    let port = config.server.port;
    let state = Arc::new(AppState {
        dataset,
        geocoder,
        config,
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("Starting server on http://{}", addr);

    let app = Router::new()
        .route("/api/calculate", post(calculate_handler))
        .route("/api/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn calculate_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CalculateRequest>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let point = GeoPoint {
        latitude: request.latitude,
        longitude: request.longitude,
    };
    if !point.in_bounds() {
        return Err(ApiError::BadRequest(
            "latitude/longitude out of range".to_string(),
        ));
    }
    if !(request.area_hectares.is_finite() && request.area_hectares > 0.0) {
        return Err(ApiError::BadRequest(
            "areaHectares must be a positive number".to_string(),
        ));
    }

    match request.land_use_type.as_str() {
        "solar" => Ok(Json(CalculateResponse::Solar {
            land_use_type: "solar",
            area_hectares: request.area_hectares,
            estimate: solar::estimate(request.area_hectares, &state.config.solar),
        })),
        "reforestation" => {
            // Any geocoder failure mode (error, empty result) reads the same
            // to the client: we could not place the point.
            let address = match state.geocoder.reverse(point).await {
                Ok(Some(address)) => address,
                Ok(None) => return Err(location_not_found()),
                Err(e) => {
                    eprintln!("Geocoder failure treated as not-found: {:?}", e);
                    return Err(location_not_found());
                }
            };

            let resolution =
                resolve::resolve_and_project(&state.dataset, &address, request.area_hectares)
                    .map_err(|e| match e {
                        ResolveError::LocationNotFound => location_not_found(),
                        ResolveError::NoReferenceData(country) => ApiError::NotFound(format!(
                            "could not determine region: no reference data for {}",
                            country
                        )),
                    })?;

            Ok(Json(CalculateResponse::Reforestation {
                land_use_type: "reforestation",
                area_hectares: request.area_hectares,
                resolution,
            }))
        }
        other => Err(ApiError::BadRequest(format!(
            "unknown landUseType: {}",
            other
        ))),
    }
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "countries": state.dataset.country_count(),
        "regions": state.dataset.region_count(),
    }))
}
