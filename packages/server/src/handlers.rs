//! HTTP handler functions for the plant map API.

use actix_web::{HttpResponse, web};
use plant_map_generate::{document, run_pipeline};
use plant_map_observation_models::SubmittedObservation;
use plant_map_server_models::{
    ApiError, ApiHealth, IdentifyRequest, NewObservationRequest, ObservationList,
};

use crate::{AppState, ValidationError, identify, upload};

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/map`
///
/// Runs the full batch pipeline against the source datasets and returns
/// the assembled feature collection. Recomputed on every request; the
/// only cache is the histogram files already on disk.
pub async fn map_document(state: web::Data<AppState>) -> HttpResponse {
    let config = state.config.clone();

    let result = web::block(move || {
        let output = run_pipeline(&config)?;
        Ok::<_, plant_map_generate::LoadError>(document::assemble_feature_collection(
            &output.parks,
            &output.aggregates,
            &config.out_dir,
            config.map_histogram_min_observations,
        ))
    })
    .await;

    match result {
        Ok(Ok(collection)) => HttpResponse::Ok().json(collection),
        Ok(Err(e)) => {
            log::error!("Pipeline failed: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to build map document"))
        }
        Err(e) => {
            log::error!("Blocking task failed: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to build map document"))
        }
    }
}

/// `GET /api/observations`
///
/// Lists user-submitted observations in submission order.
pub async fn list_observations(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ObservationList {
        observations: state.store.observations(),
    })
}

/// `POST /api/observations`
///
/// Validates and stores a user-submitted observation, saving its image
/// (when provided) under the static directory. Success answers with a
/// redirect to the observation list; a malformed submission is a 400.
pub async fn add_observation(
    state: web::Data<AppState>,
    body: web::Json<NewObservationRequest>,
) -> HttpResponse {
    let request = body.into_inner();

    match store_observation(&state, request) {
        Ok(()) => HttpResponse::SeeOther()
            .insert_header(("Location", "/api/observations"))
            .finish(),
        Err(e) => {
            log::debug!("Rejected observation submission: {e}");
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
    }
}

fn store_observation(
    state: &AppState,
    request: NewObservationRequest,
) -> Result<(), ValidationError> {
    if request.scientific_name.trim().is_empty() {
        return Err(ValidationError::new("scientific_name is required"));
    }
    if request.park_name.trim().is_empty() {
        return Err(ValidationError::new("park_name is required"));
    }
    if request.observed_on.trim().is_empty() {
        return Err(ValidationError::new("observed_on is required"));
    }

    let image_url = match (&request.image_name, &request.image_base64) {
        (Some(name), Some(payload)) => Some(upload::save_observation_image(
            &state.config.out_dir,
            name,
            payload,
        )?),
        (Some(_), None) | (None, Some(_)) => {
            return Err(ValidationError::new(
                "image_name and image_base64 must be provided together",
            ));
        }
        (None, None) => None,
    };

    state.store.add_observation(SubmittedObservation {
        scientific_name: request.scientific_name,
        common_name: request.common_name,
        observed_on: request.observed_on,
        park_name: request.park_name,
        image_url,
    });

    Ok(())
}

/// `POST /api/identify`
///
/// Proxies the photo to the identification service and forwards its
/// JSON response untouched.
pub async fn identify_plant(
    state: web::Data<AppState>,
    body: web::Json<IdentifyRequest>,
) -> HttpResponse {
    let Some(api_key) = state.plant_id_api_key.as_deref() else {
        log::error!("PLANT_ID_API_KEY not configured");
        return HttpResponse::BadGateway()
            .json(ApiError::new("Identification service not configured"));
    };

    match identify::identify_photo(&state.http, api_key, &body.image_base64).await {
        Ok(identification) => HttpResponse::Ok().json(identification),
        Err(e) => {
            log::error!("Identification failed: {e}");
            HttpResponse::BadGateway().json(ApiError::new(e.to_string()))
        }
    }
}
