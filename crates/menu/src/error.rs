use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Duplicate product {0} in the aggregates")]
    DuplicateProduct(uuid::Uuid),
}
