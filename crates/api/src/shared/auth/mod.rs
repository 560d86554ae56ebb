use crate::error::NotifierError;
use actix_web::HttpRequest;
use deadline_notifier_infra::NotifierContext;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Only internal clients knowing the configured secret are allowed through
pub fn protect_route(req: &HttpRequest, ctx: &NotifierContext) -> Result<(), NotifierError> {
    let api_key = match req.headers().get(API_KEY_HEADER) {
        Some(api_key) => match api_key.to_str() {
            Ok(api_key) => api_key,
            Err(_) => {
                return Err(NotifierError::Unauthorized(
                    "Malformed api key provided".to_string(),
                ))
            }
        },
        None => {
            return Err(NotifierError::Unauthorized(format!(
                "Unable to find api-key in {} header",
                API_KEY_HEADER
            )))
        }
    };

    if api_key == ctx.config.api_secret_key {
        Ok(())
    } else {
        Err(NotifierError::Unauthorized(format!(
            "Invalid api-key provided in {} header",
            API_KEY_HEADER
        )))
    }
}
