use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
struct ServiceInfo {
    status: &'static str,
    message: &'static str,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)));
    cfg.service(web::resource("/api/health").route(web::get().to(health_check)));
    cfg.service(web::resource("/api/version").route(web::get().to(get_version)));
}

async fn index() -> impl Responder {
    HttpResponse::Ok().json(ServiceInfo {
        status: "API is running",
        message: "Use POST /process_string (JSON body) or POST /process_file (File Upload) for analysis.",
    })
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": VERSION,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn get_version() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "version": VERSION
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_index_reports_running() {
        let app = test::init_service(App::new().configure(config)).await;
        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "API is running");
        assert!(body["message"].as_str().unwrap().contains("/process_file"));
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().configure(config)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], VERSION);
        assert!(body["timestamp"].is_string());
    }
}
