use super::{
    collection,
    error::TaskError,
    fields::{read_enum, read_text},
};
use crate::service::object::{Method, ObjectRef, Property};
use common::windows::TaskState;
use log::error;

/// One instance of a task the service is running
#[derive(Debug, Clone)]
pub struct RunningTask {
    handle: ObjectRef,
}

impl RunningTask {
    pub(crate) fn new(handle: ObjectRef) -> RunningTask {
        RunningTask { handle }
    }

    /// Identifier of the action being run
    pub fn current_action(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::CurrentAction)
    }

    /// Process id of the engine running the instance
    pub fn engine_pid(&self) -> Result<u32, TaskError> {
        let pid = self.handle.integer(Property::EnginePid)?;
        match u32::try_from(pid) {
            Ok(result) => Ok(result),
            Err(err) => {
                error!("[tasks] Engine pid {pid} is not a process id: {err:?}");
                Err(TaskError::UnexpectedValue)
            }
        }
    }

    /// GUID the service assigned to this run, in braces
    pub fn instance_guid(&self) -> Result<String, TaskError> {
        Ok(self.handle.text(Property::InstanceGuid)?)
    }

    pub fn name(&self) -> Result<String, TaskError> {
        Ok(self.handle.text(Property::Name)?)
    }

    pub fn path(&self) -> Result<String, TaskError> {
        Ok(self.handle.text(Property::Path)?)
    }

    pub fn state(&self) -> Result<TaskState, TaskError> {
        read_enum(&self.handle, Property::State)
    }

    /// Ask the service for the latest state of the instance
    pub fn refresh(&self) -> Result<(), TaskError> {
        self.handle.call(Method::Refresh)?;
        Ok(())
    }

    pub fn stop(&self) -> Result<(), TaskError> {
        self.handle.call(Method::Stop(0))?;
        Ok(())
    }
}

/// Read only list of running task instances
#[derive(Debug, Clone)]
pub struct RunningTaskCollection {
    handle: ObjectRef,
}

impl RunningTaskCollection {
    pub(crate) fn new(handle: ObjectRef) -> RunningTaskCollection {
        RunningTaskCollection { handle }
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

    pub fn item(&self, index: usize) -> Result<RunningTask, TaskError> {
        Ok(RunningTask::new(collection::item(&self.handle, index)?))
    }

    pub fn to_vec(&self) -> Result<Vec<RunningTask>, TaskError> {
        let handles = collection::items(&self.handle)?;
        Ok(handles.into_iter().map(RunningTask::new).collect())
    }

    pub fn iter(&self) -> Result<std::vec::IntoIter<RunningTask>, TaskError> {
        Ok(self.to_vec()?.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::RunningTaskCollection;
    use crate::{
        service::{
            memory::memory_service,
            object::{Method, ObjectRef, ServiceObject},
        },
        tasks::error::TaskError,
    };
    use common::{flags::CreationFlags, windows::TaskState};

    fn service_with_task() -> (ObjectRef, ObjectRef) {
        let service = memory_service();
        service
            .call(Method::Connect {
                server: None,
                user: None,
                domain: None,
                password: None,
            })
            .unwrap();
        let root = service
            .call(Method::GetFolder(String::from("\\")))
            .unwrap()
            .into_object()
            .unwrap();
        let definition = service.call(Method::NewTask(0)).unwrap().into_object().unwrap();
        let task = root
            .call(Method::RegisterTaskDefinition {
                path: Some(String::from("Cleanup")),
                definition,
                flags: CreationFlags::CREATE.bits(),
                user: None,
                password: None,
                logon_type: 3,
                sddl: None,
            })
            .unwrap()
            .into_object()
            .unwrap();
        (service, task)
    }

    #[test]
    fn test_running_instance() {
        let (service, task) = service_with_task();
        task.call(Method::Run(None)).unwrap();

        let running = RunningTaskCollection::new(
            service
                .call(Method::GetRunningTasks(0))
                .unwrap()
                .into_object()
                .unwrap(),
        );
        assert_eq!(running.len().unwrap(), 1);

        let instance = running.item(0).unwrap();
        assert_eq!(instance.name().unwrap(), "Cleanup");
        assert_eq!(instance.path().unwrap(), "\\Cleanup");
        assert_eq!(instance.state().unwrap(), TaskState::Running);
        assert_eq!(instance.engine_pid().unwrap(), std::process::id());
        assert!(instance.instance_guid().unwrap().starts_with('{'));
        assert_eq!(instance.current_action().unwrap(), None);

        instance.refresh().unwrap();
        instance.stop().unwrap();
        assert_eq!(instance.state().unwrap(), TaskState::Ready);
        assert_eq!(running.item(1).unwrap_err(), TaskError::IndexOutOfRange);
    }
}
