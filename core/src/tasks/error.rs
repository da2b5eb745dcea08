use crate::{
    service::error::{ServiceError, ERROR_ALREADY_EXISTS},
    utils::error::TimeError,
};
use log::error;
use std::fmt;

#[derive(Debug, PartialEq)]
pub enum TaskError {
    FolderNotFound,
    FolderExists,
    TaskNotFound,
    TaskExists,
    IndexOutOfRange,
    UnsupportedKind,
    UnexpectedValue,
    Instant,
    Priority,
    Serialize,
    Service(ServiceError),
}

impl std::error::Error for TaskError {}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::FolderNotFound => write!(f, "Task folder not found"),
            TaskError::FolderExists => write!(f, "Task folder already exists"),
            TaskError::TaskNotFound => write!(f, "Task not found"),
            TaskError::TaskExists => write!(f, "Task already exists"),
            TaskError::IndexOutOfRange => write!(f, "Collection index out of range"),
            TaskError::UnsupportedKind => write!(f, "Unsupported action or trigger type"),
            TaskError::UnexpectedValue => write!(f, "Service returned an unexpected value"),
            TaskError::Instant => write!(f, "Could not parse date and time"),
            TaskError::Priority => write!(f, "Priority must be between 0 and 10"),
            TaskError::Serialize => write!(f, "Could not serialize task"),
            TaskError::Service(err) => write!(f, "{err}"),
        }
    }
}

impl From<ServiceError> for TaskError {
    fn from(err: ServiceError) -> TaskError {
        TaskError::Service(err)
    }
}

impl From<TimeError> for TaskError {
    fn from(_err: TimeError) -> TaskError {
        TaskError::Instant
    }
}

/// Replace a not found service failure with `mapped`. Other failures keep their status code
pub(crate) fn map_not_found(err: ServiceError, mapped: TaskError, what: &str) -> TaskError {
    if err.is_not_found() {
        error!("[tasks] {what} does not exist: {err}");
        return mapped;
    }
    TaskError::Service(err)
}

/// Replace an already exists service failure with `mapped`. Other failures keep their status code
pub(crate) fn map_exists(err: ServiceError, mapped: TaskError, what: &str) -> TaskError {
    if err.is(ERROR_ALREADY_EXISTS) {
        error!("[tasks] {what} already exists: {err}");
        return mapped;
    }
    TaskError::Service(err)
}
