use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnomalyError {
    #[error(transparent)]
    Core(#[from] CoreError),
}
