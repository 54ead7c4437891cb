use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BasketError {
    #[error(transparent)]
    Core(#[from] CoreError),
}
