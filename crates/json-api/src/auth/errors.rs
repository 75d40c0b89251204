//! Auth Errors

use salvo::http::StatusError;
use tracing::error;

use agora_app::auth::AuthServiceError;

pub(crate) fn into_status_error(error: AuthServiceError) -> StatusError {
    match error {
        AuthServiceError::InvalidCredential => {
            StatusError::unauthorized().brief("Invalid email or password")
        }
        AuthServiceError::NotActivated => {
            StatusError::forbidden().brief("Account has not been activated")
        }
        AuthServiceError::TokenNotFound => {
            StatusError::bad_request().brief("Invalid or expired token")
        }
        AuthServiceError::EmailTaken => {
            StatusError::conflict().brief("Email address is already registered")
        }
        AuthServiceError::InvalidRegistration => {
            StatusError::bad_request().brief("First name, last name, email and password are required")
        }
        AuthServiceError::DuplicateKey => {
            error!("token generation collided twice");

            StatusError::internal_server_error()
        }
        AuthServiceError::Store(source) => {
            error!("token store failure: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Directory(source) => {
            error!("user directory failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
