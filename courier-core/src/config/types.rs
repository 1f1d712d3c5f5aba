use rst_common::with_errors::thiserror::{self, Error};

#[derive(Debug, PartialEq, Error)]
pub enum CommonError {
    #[error("validation error: {0}")]
    ValidationError(String),
}

pub trait ToValidate {
    fn validate(&self) -> Result<(), CommonError>;
}

pub fn validate(validator: impl ToValidate) -> Result<(), CommonError> {
    validator.validate()
}
