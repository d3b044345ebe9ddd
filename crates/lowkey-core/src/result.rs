use crate::error::LowkeyError;

pub type Result<T> = std::result::Result<T, LowkeyError>;
