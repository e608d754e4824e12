use actix_web::{App, HttpResponse, HttpServer, Responder, http::StatusCode, middleware, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::{NewLeaderboardEntry, ValidationError};
use super::store::LeaderboardStore;

#[derive(Debug, Deserialize, Default)]
struct TopQuery {
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    entries: usize,
}

pub(crate) fn json_error(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "success": false,
        "error": message.into(),
    }))
}

async fn health(store: web::Data<LeaderboardStore>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        service: "vc-snake-leaderboard",
        entries: store.len(),
    })
}

async fn top_entries(
    store: web::Data<LeaderboardStore>,
    query: web::Query<TopQuery>,
) -> impl Responder {
    HttpResponse::Ok().json(store.top(query.limit))
}

async fn submit_entry(store: web::Data<LeaderboardStore>, body: web::Bytes) -> HttpResponse {
    let parsed = serde_json::from_slice::<Value>(&body)
        .map_err(|e| ValidationError::Malformed(e.to_string()))
        .and_then(|value| NewLeaderboardEntry::validate(&value));
    let submission = match parsed {
        Ok(submission) => submission,
        Err(e) => {
            tracing::debug!(error = %e, "rejected leaderboard submission");
            return json_error(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let store = store.into_inner();
    match web::block(move || store.add(submission)).await {
        Ok(Ok(entry)) => {
            tracing::info!(
                player = %entry.player_name,
                score = entry.score,
                id = %entry.id,
                "leaderboard entry stored"
            );
            HttpResponse::Ok().json(entry)
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "failed to persist leaderboard entry");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to store entry")
        }
        Err(e) => {
            tracing::error!(error = %e, "leaderboard write task failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to store entry")
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/api/leaderboard", web::get().to(top_entries))
        .route("/api/leaderboard", web::post().to(submit_entry));
}

/// Run the leaderboard service until the process is stopped
pub async fn serve(bind_addr: &str, store: LeaderboardStore) -> std::io::Result<()> {
    let store = web::Data::new(store);
    tracing::info!(bind = bind_addr, "starting leaderboard server");

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
