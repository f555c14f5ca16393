/// Request identity for social-service
///
/// Authentication happens upstream; the gateway forwards the verified caller
/// id in the `x-user-id` header. Handlers take a `UserId` argument to require it.
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Acting caller, extracted from the `x-user-id` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

impl FromRequest for UserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract_user_id(req).map(UserId))
    }
}

fn extract_user_id(req: &HttpRequest) -> Result<Uuid, AppError> {
    let header_value = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Missing x-user-id header".into()))?;

    let value = header_value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid x-user-id header".into()))?;

    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::Unauthorized("Invalid x-user-id header value".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_extracts_valid_header() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, id.to_string()))
            .to_http_request();

        assert_eq!(extract_user_id(&req).unwrap(), id);
    }

    #[test]
    fn test_missing_or_malformed_header_is_unauthorized() {
        let missing = TestRequest::default().to_http_request();
        assert!(matches!(
            extract_user_id(&missing),
            Err(AppError::Unauthorized(_))
        ));

        let malformed = TestRequest::default()
            .insert_header((USER_ID_HEADER, "not-a-uuid"))
            .to_http_request();
        assert!(matches!(
            extract_user_id(&malformed),
            Err(AppError::Unauthorized(_))
        ));
    }
}
