use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode, Uri},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::error::{AppResult, Error};
use crate::model::{GenerateReminderRequest, Reminder};
use crate::AppState;

/// Handler for reminder generation
pub async fn generate_reminder_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateReminderRequest>, JsonRejection>,
) -> AppResult<Json<Reminder>> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let err = Error::from(rejection);
            warn!("Rejected reminder request: {}", err);
            return Err(err);
        }
    };

    let Some(base64_image) = request.image() else {
        warn!("Reminder request without image data");
        return Err(Error::MissingImage);
    };

    info!(
        "Generating reminder for image of {} base64 characters",
        base64_image.len()
    );

    match state.generator.generate(base64_image).await {
        Ok(reminder) => {
            info!(
                "Reminder generated, time and date found: {}",
                reminder.time_and_date_found
            );
            Ok(Json(reminder))
        }
        Err(e) => {
            error!("Error: {:?}", e);
            Err(e)
        }
    }
}

/// Handler for API health check
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// JSON 404 for paths that have no route
pub async fn not_found_handler(method: Method, uri: Uri) -> Error {
    debug!("No route for {} {}", method, uri);
    Error::InvalidRequest {
        status: StatusCode::NOT_FOUND,
        message: format!("No route for {} {}", method, uri.path()),
    }
}

/// JSON 405 for known paths hit with the wrong method
pub async fn method_not_allowed_handler(method: Method, uri: Uri) -> Error {
    debug!("Method {} not allowed for {}", method, uri);
    Error::InvalidRequest {
        status: StatusCode::METHOD_NOT_ALLOWED,
        message: format!("Method {} not allowed for {}", method, uri.path()),
    }
}
