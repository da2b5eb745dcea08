use super::error::TaskError;
use crate::{
    service::object::{ObjectRef, Property},
    utils::{
        strings::non_empty,
        time::{decode_instant, decode_offset, encode_instant, encode_offset_or, Instant, Offset},
    },
};
use log::error;

/// Read a date property. Empty text means not set
pub(crate) fn read_instant(
    handle: &ObjectRef,
    property: Property,
) -> Result<Option<Instant>, TaskError> {
    let text = handle.text(property)?;
    Ok(decode_instant(&text)?)
}

pub(crate) fn write_instant(
    handle: &ObjectRef,
    property: Property,
    value: Option<Instant>,
) -> Result<(), TaskError> {
    handle.put_text(property, &encode_instant(value))?;
    Ok(())
}

/// Read a duration property. Zero and unreadable durations are not set
pub(crate) fn read_offset(
    handle: &ObjectRef,
    property: Property,
) -> Result<Option<Offset>, TaskError> {
    let text = handle.text(property)?;
    Ok(decode_offset(&text))
}

/// Write a duration property, using `default` when the duration is not set
pub(crate) fn write_offset(
    handle: &ObjectRef,
    property: Property,
    value: Option<Offset>,
    default: &str,
) -> Result<(), TaskError> {
    handle.put_text(property, &encode_offset_or(value, default))?;
    Ok(())
}

pub(crate) fn read_text(handle: &ObjectRef, property: Property) -> Result<Option<String>, TaskError> {
    Ok(non_empty(handle.text(property)?))
}

pub(crate) fn read_i32(handle: &ObjectRef, property: Property) -> Result<i32, TaskError> {
    let value = handle.integer(property)?;
    match i32::try_from(value) {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[service] Property {property:?} value {value} does not fit: {err:?}");
            Err(TaskError::UnexpectedValue)
        }
    }
}

/// Read a bit mask property. Masks using the top bit come back as negative 32 bit values
pub(crate) fn read_mask(handle: &ObjectRef, property: Property) -> Result<u32, TaskError> {
    let value = handle.integer(property)?;
    if let Ok(result) = u32::try_from(value) {
        return Ok(result);
    }
    match i32::try_from(value) {
        Ok(result) => Ok(result as u32),
        Err(err) => {
            error!("[service] Mask {property:?} value {value} does not fit: {err:?}");
            Err(TaskError::UnexpectedValue)
        }
    }
}

/// Read a 16 bit wide bit mask property
pub(crate) fn read_short_mask(handle: &ObjectRef, property: Property) -> Result<u16, TaskError> {
    let value = read_mask(handle, property)?;
    match u16::try_from(value) {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[service] Mask {property:?} value {value:#x} is wider than 16 bits: {err:?}");
            Err(TaskError::UnexpectedValue)
        }
    }
}

/// Read an integer property as one of the service enums
pub(crate) fn read_enum<T>(handle: &ObjectRef, property: Property) -> Result<T, TaskError>
where
    T: TryFrom<i32, Error = i32>,
{
    let raw = read_i32(handle, property)?;
    match T::try_from(raw) {
        Ok(result) => Ok(result),
        Err(raw) => {
            error!("[service] Property {property:?} has unknown value {raw}");
            Err(TaskError::UnexpectedValue)
        }
    }
}
