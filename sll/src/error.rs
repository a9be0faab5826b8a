use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("failed to allocate {size} bytes (align {align}) for a list node")]
    Alloc { size: usize, align: usize },
}

pub type Result<T> = core::result::Result<T, Error>;
