use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};

use crate::domain::session::{Role, Session};
use crate::errors::AppError;

pub const USER_HEADER: &str = "X-User";
pub const ROLE_HEADER: &str = "X-Role";

/// The session is established by the authenticator in front of this
/// service and forwarded as two headers.
impl FromRequest for Session {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(session_from_request(req))
    }
}

fn session_from_request(req: &HttpRequest) -> Result<Session, AppError> {
    let user = header_value(req, USER_HEADER)?;
    let role = header_value(req, ROLE_HEADER)?
        .parse::<Role>()
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;
    Ok(Session::new(user, role))
}

fn header_value(req: &HttpRequest, name: &str) -> Result<String, AppError> {
    let value = req
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();
    if value.is_empty() {
        return Err(AppError::Unauthorized(format!("missing {name} header")));
    }
    Ok(value.to_string())
}
