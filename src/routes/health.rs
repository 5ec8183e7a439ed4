use actix_web::HttpResponse;

pub async fn health() -> HttpResponse {
    tracing::debug!("Health check endpoint called");
    HttpResponse::Ok().json(serde_json::json!({ "status": "OK" }))
}
