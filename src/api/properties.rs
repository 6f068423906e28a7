use actix_web::{HttpResponse, get, post, web};
use log::debug;

use super::models::{
    AppState, EndRentalRequest, MinedResponse, NewPropertyRequest, PropertiesResponse,
    RentRequest, TransferRequest,
};
use super::with_service;
use crate::blockchain::Block;
use crate::error::Result;
use crate::registry::Property;
use crate::service::PropertyService;

#[get("/properties/")]
pub async fn get_properties(state: web::Data<AppState>) -> actix_web::Result<HttpResponse> {
    let properties = with_service(state, |svc| Ok(svc.get_properties())).await?;
    Ok(HttpResponse::Ok().json(PropertiesResponse {
        count: properties.len(),
        properties,
    }))
}

#[get("/properties/{id}/")]
pub async fn get_property(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    let id = path.into_inner();
    let property = with_service(state, move |svc| svc.get_property(&id)).await?;
    Ok(HttpResponse::Ok().json(property))
}

/// Mine a `create_property` transaction and register the property.
#[post("/properties/")]
pub async fn create_property(
    state: web::Data<AppState>,
    body: web::Json<NewPropertyRequest>,
) -> actix_web::Result<HttpResponse> {
    let req = body.into_inner();
    let property = with_service(state, move |svc| {
        svc.create_property(&req.owner, &req.title, &req.description)
    })
    .await?;
    Ok(HttpResponse::Created().json(property))
}

#[post("/properties/{id}/transfer/")]
pub async fn transfer_property(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<TransferRequest>,
) -> actix_web::Result<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();
    let resp = mine_with(state, move |svc| {
        let block = svc.transfer_property(&req.actor, &id, &req.new_owner)?;
        Ok((block, svc.get_property(&id)?))
    })
    .await?;
    Ok(HttpResponse::Ok().json(resp))
}

#[post("/properties/{id}/rent/")]
pub async fn rent_property(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<RentRequest>,
) -> actix_web::Result<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();
    let resp = mine_with(state, move |svc| {
        let block = svc.rent_property(&req.actor, &id, &req.renter)?;
        Ok((block, svc.get_property(&id)?))
    })
    .await?;
    Ok(HttpResponse::Ok().json(resp))
}

#[post("/properties/{id}/end-rental/")]
pub async fn end_rental(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<EndRentalRequest>,
) -> actix_web::Result<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();
    let resp = mine_with(state, move |svc| {
        let block = svc.end_rental(&req.actor, &id)?;
        Ok((block, svc.get_property(&id)?))
    })
    .await?;
    Ok(HttpResponse::Ok().json(resp))
}

/* -------------------- Helpers -------------------- */

/// Run a mining operation and shape the mined block into a response.
async fn mine_with<F>(state: web::Data<AppState>, op: F) -> actix_web::Result<MinedResponse>
where
    F: FnOnce(&mut PropertyService) -> Result<(Block, Property)> + Send + 'static,
{
    let (block, property) = with_service(state, op).await?;

    let hash = block.hash()?;
    debug!("mined block #{} for property {}", block.index, property.id);
    Ok(MinedResponse {
        mined_index: block.index,
        hash,
        nonce: block.nonce,
        property,
    })
}
