use actix_web::{HttpResponse, get, web};

use super::models::{AppState, StatsResponse};
use super::with_service;

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> actix_web::Result<HttpResponse> {
    let stats = with_service(state, |svc| {
        let chain = svc.get_chain();

        // last interval
        let last_interval_secs = match chain {
            [.., older, newer] => Some((newer.timestamp - older.timestamp).max(0)),
            _ => None,
        };

        Ok(StatsResponse {
            height: chain.len(),
            difficulty: svc.difficulty(),
            accounts: svc.account_count(),
            properties: svc.property_count(),
            last_block_timestamp: chain.last().map(|b| b.timestamp),
            last_interval_secs,
        })
    })
    .await?;
    Ok(HttpResponse::Ok().json(stats))
}
