use actix_web::{HttpResponse, get, web};
use log::warn;

use super::models::{AppState, BlockView, ChainResponse, ValidateResponse};
use super::with_service;
use crate::error::Result;

/// Get the full chain, each block with its derived hash.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> actix_web::Result<HttpResponse> {
    let resp = with_service(state, |svc| {
        let chain = svc
            .get_chain()
            .iter()
            .map(|block| {
                Ok(BlockView {
                    hash: block.hash()?,
                    block: block.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ChainResponse {
            length: chain.len(),
            difficulty: svc.difficulty(),
            chain,
        })
    })
    .await?;
    Ok(HttpResponse::Ok().json(resp))
}

/// Validate the whole chain. Violations are reported, never repaired.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> actix_web::Result<HttpResponse> {
    let resp = with_service(state, |svc| {
        let violation = svc.validate_chain().err();
        Ok(ValidateResponse {
            valid: violation.is_none(),
            length: svc.get_chain().len(),
            difficulty: svc.difficulty(),
            violation,
        })
    })
    .await?;
    if let Some(v) = &resp.violation {
        warn!("chain validation failed: {}", v);
    }
    Ok(HttpResponse::Ok().json(resp))
}
