mod accounts;
mod chain;
mod health;
pub mod models;
mod properties;
mod stats;

use actix_web::http::StatusCode;
use actix_web::web::{self, ServiceConfig};
use actix_web::{HttpResponse, ResponseError};

use crate::error::{ChainError, Result};
use crate::service::PropertyService;
pub use models::AppState;
use models::ErrorResponse;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::validate_chain)
            .service(stats::get_stats)
            .service(accounts::get_accounts)
            .service(accounts::create_account)
            .service(properties::get_properties)
            .service(properties::get_property)
            .service(properties::create_property)
            .service(properties::transfer_property)
            .service(properties::rent_property)
            .service(properties::end_rental),
    );
}

/// Run `op` against the locked service on the blocking pool. The lock can be
/// held for a whole mining run, so waiting on it must not tie up an async worker.
pub(crate) async fn with_service<T, F>(state: web::Data<AppState>, op: F) -> actix_web::Result<T>
where
    F: FnOnce(&mut PropertyService) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let out = web::block(move || {
        let mut svc = state.service()?;
        op(&mut *svc)
    })
    .await??;
    Ok(out)
}

impl ResponseError for ChainError {
    fn status_code(&self) -> StatusCode {
        match self {
            ChainError::PropertyNotFound(_) | ChainError::AccountNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ChainError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ChainError::DuplicateAccountId(_) => StatusCode::CONFLICT,
            ChainError::NoOpTransfer
            | ChainError::SelfRental
            | ChainError::NotRented(_)
            | ChainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ChainError::EmptyChain
            | ChainError::Io(_)
            | ChainError::Serialization(_)
            | ChainError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
