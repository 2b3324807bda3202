//! Error conversion glue between form/domain errors and the service layer.

use crate::domain::types::TypeConstraintError;
use crate::forms::import_export::UploadParseError;
use crate::forms::products::{DeleteProductFormError, SaveProductFormError};
use crate::forms::users::SaveUserFormError;
use crate::services::errors::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<SaveProductFormError> for ServiceError {
    fn from(val: SaveProductFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<DeleteProductFormError> for ServiceError {
    fn from(val: DeleteProductFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<SaveUserFormError> for ServiceError {
    fn from(val: SaveUserFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<UploadParseError> for ServiceError {
    fn from(val: UploadParseError) -> Self {
        ServiceError::Form(val.to_string())
    }
}
