use anyhow::anyhow;
use platform_api::ApiError;
use platform_authn::AuthnError;
use platform_authz::AuthzError;
use products_hr::HrError;

pub fn api_error(err: HrError) -> ApiError {
    match err {
        HrError::InvalidQuery(message) => ApiError::InvalidInput(message),
        err @ HrError::InvalidValue { .. } => ApiError::InvalidInput(err.to_string()),
        HrError::UnknownKind(_) => ApiError::NotFound,
        err @ HrError::Conflict { .. } => ApiError::Conflict(err.to_string()),
        err @ HrError::Unavailable(_) => ApiError::internal(anyhow!(err)),
    }
}

pub fn authn_error(err: AuthnError) -> ApiError {
    match err {
        AuthnError::InvalidCredentials | AuthnError::UnknownUser(_) => ApiError::Unauthorized,
    }
}

pub fn authz_error(err: AuthzError) -> ApiError {
    ApiError::Forbidden(err.to_string())
}
