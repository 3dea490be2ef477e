use std::collections::BTreeMap;

use iron::status::{self, Status};
use iron::IronError;
use rustc_serialize::json::Json;
use thiserror::Error;

/// Every failure a request can end in. The `Display` text is the client-facing message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    #[error("Missing title or content")]
    MissingFields,

    #[error("Post not found")]
    PostNotFound { id: u64 },

    #[error("At least one search parameter ('title' or 'content') is required")]
    MissingSearchCriteria,

    #[error("Page not found")]
    RouteNotFound,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> Status {
        match *self {
            ApiError::MissingFields | ApiError::MissingSearchCriteria => status::BadRequest,
            ApiError::PostNotFound { .. } | ApiError::RouteNotFound => status::NotFound,
            ApiError::Internal => status::InternalServerError,
        }
    }

    /// `{"error": <message>}`
    pub fn body(&self) -> Json {
        let mut object = BTreeMap::new();
        object.insert("error".to_string(), Json::String(self.to_string()));
        Json::Object(object)
    }
}

impl From<ApiError> for IronError {
    fn from(err: ApiError) -> IronError {
        let status = err.status();
        let body = err.body().to_string();
        IronError::new(err, (status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(ApiError::MissingFields.status(), status::BadRequest);
        assert_eq!(ApiError::MissingSearchCriteria.status(), status::BadRequest);
        assert_eq!(ApiError::PostNotFound { id: 3 }.status(), status::NotFound);
        assert_eq!(ApiError::RouteNotFound.status(), status::NotFound);
        assert_eq!(ApiError::Internal.status(), status::InternalServerError);
    }

    #[test]
    fn body_carries_error_key() {
        let body = ApiError::PostNotFound { id: 9 }.body();
        assert_eq!(
            body.find("error").and_then(Json::as_string),
            Some("Post not found")
        );
    }

    #[test]
    fn converts_into_iron_error_with_response() {
        let err: IronError = ApiError::MissingFields.into();
        assert_eq!(err.response.status, Some(status::BadRequest));
        assert!(err.error.is::<ApiError>());
    }
}
