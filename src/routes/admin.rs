use actix_web::{web, HttpResponse};

use crate::state::AppState;

/// GET /admin/metrics
pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "requests": state.requests_served(),
    }))
}

/// POST /admin/reset
pub async fn reset(state: web::Data<AppState>) -> HttpResponse {
    state.reset_requests();
    tracing::info!("Request counter reset");

    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hits reset to 0")
}
