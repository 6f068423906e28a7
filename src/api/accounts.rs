use actix_web::{HttpResponse, get, post, web};

use super::models::{AccountsResponse, AppState, NewAccountRequest};
use super::with_service;

#[get("/accounts/")]
pub async fn get_accounts(state: web::Data<AppState>) -> actix_web::Result<HttpResponse> {
    let accounts = with_service(state, |svc| Ok(svc.get_accounts())).await?;
    Ok(HttpResponse::Ok().json(AccountsResponse {
        count: accounts.len(),
        accounts,
    }))
}

#[post("/accounts/")]
pub async fn create_account(
    state: web::Data<AppState>,
    body: web::Json<NewAccountRequest>,
) -> actix_web::Result<HttpResponse> {
    let req = body.into_inner();
    let account = with_service(state, move |svc| svc.create_account(&req.id, &req.name)).await?;
    Ok(HttpResponse::Created().json(account))
}
