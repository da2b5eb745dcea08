use super::{
    collection,
    definition::TaskDefinition,
    error::TaskError,
    fields::{read_enum, read_i32, read_instant, read_mask, read_text},
    running::{RunningTask, RunningTaskCollection},
};
use crate::{
    service::object::{Method, ObjectRef, Property, Variant},
    utils::time::{decode_instant, encode_instant, Instant},
};
use common::{
    flags::{RunFlags, SecurityInformation},
    windows::TaskState,
};
use log::{error, warn};

/// A task stored by the service
#[derive(Debug, Clone)]
pub struct RegisteredTask {
    handle: ObjectRef,
}

impl RegisteredTask {
    pub(crate) fn new(handle: ObjectRef) -> RegisteredTask {
        RegisteredTask { handle }
    }

    pub fn definition(&self) -> Result<TaskDefinition, TaskError> {
        Ok(TaskDefinition::new(
            self.handle.get_object(Property::Definition)?,
        ))
    }

    pub fn enabled(&self) -> Result<bool, TaskError> {
        Ok(self.handle.boolean(Property::Enabled)?)
    }

    pub fn set_enabled(&self, value: bool) -> Result<(), TaskError> {
        Ok(self.handle.put_bool(Property::Enabled, value)?)
    }

    pub fn last_run_time(&self) -> Result<Option<Instant>, TaskError> {
        read_instant(&self.handle, Property::LastRunTime)
    }

    pub fn next_run_time(&self) -> Result<Option<Instant>, TaskError> {
        read_instant(&self.handle, Property::NextRunTime)
    }

    /// Status code of the last run. 0 is success, 0x41301 means still running
    pub fn last_task_result(&self) -> Result<u32, TaskError> {
        read_mask(&self.handle, Property::LastTaskResult)
    }

    pub fn name(&self) -> Result<String, TaskError> {
        Ok(self.handle.text(Property::Name)?)
    }

    pub fn number_of_missed_runs(&self) -> Result<i32, TaskError> {
        read_i32(&self.handle, Property::NumberOfMissedRuns)
    }

    pub fn path(&self) -> Result<String, TaskError> {
        Ok(self.handle.text(Property::Path)?)
    }

    pub fn state(&self) -> Result<TaskState, TaskError> {
        read_enum(&self.handle, Property::State)
    }

    pub fn xml(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Xml)
    }

    /// Instances of this task that are running now
    pub fn get_instances(&self) -> Result<RunningTaskCollection, TaskError> {
        let reply = self.handle.call(Method::GetInstances(0))?;
        Ok(RunningTaskCollection::new(reply.into_object()?))
    }

    /// Times the task is scheduled to start between `start` and `end`, at most `count` of them
    pub fn get_run_times(
        &self,
        start: Instant,
        end: Instant,
        count: u32,
    ) -> Result<Vec<Instant>, TaskError> {
        let reply = self.handle.call(Method::GetRunTimes {
            start: encode_instant(Some(start)),
            end: encode_instant(Some(end)),
            count,
        })?;

        let mut runs = Vec::new();
        for value in reply.into_values()? {
            let text = match value {
                Variant::Text(result) => result,
                other => {
                    error!("[tasks] Run time came back as {other:?}");
                    return Err(TaskError::UnexpectedValue);
                }
            };
            match decode_instant(&text)? {
                Some(run) => runs.push(run),
                None => warn!("[tasks] Skipping empty run time"),
            }
        }
        Ok(runs)
    }

    pub fn get_security_descriptor(
        &self,
        info: SecurityInformation,
    ) -> Result<String, TaskError> {
        let reply = self.handle.call(Method::GetSecurityDescriptor(info.bits()))?;
        match reply.into_value()? {
            Variant::Text(sddl) => Ok(sddl),
            Variant::Empty => Ok(String::new()),
            other => {
                error!("[tasks] Security descriptor came back as {other:?}");
                Err(TaskError::UnexpectedValue)
            }
        }
    }

    pub fn set_security_descriptor(
        &self,
        sddl: &str,
        info: SecurityInformation,
    ) -> Result<(), TaskError> {
        self.handle.call(Method::SetSecurityDescriptor {
            sddl: sddl.to_string(),
            flags: info.bits(),
        })?;
        Ok(())
    }

    /// Start the task now
    pub fn run(&self, params: Option<&str>) -> Result<RunningTask, TaskError> {
        let reply = self.handle.call(Method::Run(params.map(str::to_string)))?;
        Ok(RunningTask::new(reply.into_object()?))
    }

    /// Start the task now with run flags, optionally in another session or as another user
    pub fn run_ex(
        &self,
        params: Option<&str>,
        flags: RunFlags,
        session_id: i32,
        user: Option<&str>,
    ) -> Result<RunningTask, TaskError> {
        let reply = self.handle.call(Method::RunEx {
            params: params.map(str::to_string),
            flags: flags.bits(),
            session_id,
            user: user.map(str::to_string),
        })?;
        Ok(RunningTask::new(reply.into_object()?))
    }

    /// Stop every running instance
    pub fn stop(&self) -> Result<(), TaskError> {
        self.handle.call(Method::Stop(0))?;
        Ok(())
    }
}

/// Read only list of registered tasks
#[derive(Debug, Clone)]
pub struct RegisteredTaskCollection {
    handle: ObjectRef,
}

impl RegisteredTaskCollection {
    pub(crate) fn new(handle: ObjectRef) -> RegisteredTaskCollection {
        RegisteredTaskCollection { handle }
    }

    pub fn count(&self) -> Result<usize, TaskError> {
        collection::count(&self.handle)
    }

    pub fn len(&self) -> Result<usize, TaskError> {
        self.count()
    }

    pub fn is_empty(&self) -> Result<bool, TaskError> {
        Ok(self.count()? == 0)
    }

    pub fn item(&self, index: usize) -> Result<RegisteredTask, TaskError> {
        Ok(RegisteredTask::new(collection::item(&self.handle, index)?))
    }

    pub fn to_vec(&self) -> Result<Vec<RegisteredTask>, TaskError> {
        let handles = collection::items(&self.handle)?;
        Ok(handles.into_iter().map(RegisteredTask::new).collect())
    }

    pub fn iter(&self) -> Result<std::vec::IntoIter<RegisteredTask>, TaskError> {
        Ok(self.to_vec()?.into_iter())
    }
}
