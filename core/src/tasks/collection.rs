use super::error::TaskError;
use crate::service::{
    error::{DISP_E_BADINDEX, E_INVALIDARG},
    object::{Method, ObjectRef, Property},
};
use log::error;

/// Number of members in a service collection
pub(crate) fn count(handle: &ObjectRef) -> Result<usize, TaskError> {
    let count = handle.integer(Property::Count)?;
    match usize::try_from(count) {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[service] Collection reported count {count}: {err:?}");
            Err(TaskError::UnexpectedValue)
        }
    }
}

/// Collections in the service start at 1
fn service_index(index: usize) -> Result<i32, TaskError> {
    match index.checked_add(1).map(i32::try_from) {
        Some(Ok(result)) => Ok(result),
        _ => Err(TaskError::IndexOutOfRange),
    }
}

/// Fetch the member at a 0-based index
pub(crate) fn item(handle: &ObjectRef, index: usize) -> Result<ObjectRef, TaskError> {
    let reply = match handle.call(Method::Item(service_index(index)?)) {
        Ok(result) => result,
        Err(err) if err.is(DISP_E_BADINDEX) || err.is(E_INVALIDARG) => {
            error!("[service] No item at index {index}: {err}");
            return Err(TaskError::IndexOutOfRange);
        }
        Err(err) => return Err(err.into()),
    };
    Ok(reply.into_object()?)
}

/// Every member in collection order
pub(crate) fn items(handle: &ObjectRef) -> Result<Vec<ObjectRef>, TaskError> {
    Ok(handle.call(Method::Items)?.into_objects()?)
}

/// Remove the member at a 0-based index
pub(crate) fn remove(handle: &ObjectRef, index: usize) -> Result<(), TaskError> {
    match handle.call(Method::Remove(service_index(index)?)) {
        Ok(_) => Ok(()),
        Err(err) if err.is(DISP_E_BADINDEX) || err.is(E_INVALIDARG) => {
            error!("[service] Cannot remove index {index}: {err}");
            Err(TaskError::IndexOutOfRange)
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn clear(handle: &ObjectRef) -> Result<(), TaskError> {
    handle.call(Method::Clear)?;
    Ok(())
}
