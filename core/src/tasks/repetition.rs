use super::{
    error::TaskError,
    fields::{read_offset, write_offset},
};
use crate::{
    service::object::{ObjectRef, Property},
    utils::time::{Offset, DEFAULT_DURATION},
};

/// How often a trigger restarts the task after it first fires, and for how long
#[derive(Debug, Clone)]
pub struct RepetitionPattern {
    handle: ObjectRef,
}

impl RepetitionPattern {
    pub(crate) fn new(handle: ObjectRef) -> RepetitionPattern {
        RepetitionPattern { handle }
    }

    /// Time between restarts. Not set means the task is not repeated
    pub fn interval(&self) -> Result<Option<Offset>, TaskError> {
        read_offset(&self.handle, Property::Interval)
    }

    pub fn set_interval(&self, value: Option<Offset>) -> Result<(), TaskError> {
        write_offset(&self.handle, Property::Interval, value, DEFAULT_DURATION)
    }

    /// How long to keep repeating. Not set means indefinitely
    pub fn duration(&self) -> Result<Option<Offset>, TaskError> {
        read_offset(&self.handle, Property::Duration)
    }

    pub fn set_duration(&self, value: Option<Offset>) -> Result<(), TaskError> {
        write_offset(&self.handle, Property::Duration, value, DEFAULT_DURATION)
    }

    pub fn stop_at_duration_end(&self) -> Result<bool, TaskError> {
        Ok(self.handle.boolean(Property::StopAtDurationEnd)?)
    }

    pub fn set_stop_at_duration_end(&self, value: bool) -> Result<(), TaskError> {
        Ok(self.handle.put_bool(Property::StopAtDurationEnd, value)?)
    }
}
