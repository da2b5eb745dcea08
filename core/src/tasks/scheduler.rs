use super::{
    definition::TaskDefinition,
    error::{map_not_found, TaskError},
    folder::TaskFolder,
    running::RunningTaskCollection,
};
use crate::service::object::{Method, ObjectRef, Property};
use common::flags::EnumFlags;
use log::{error, info};

/// Entry point to the scheduling service. Everything else is reached from here
#[derive(Debug, Clone)]
pub struct TaskService {
    handle: ObjectRef,
}

impl TaskService {
    /// Wrap a service backend. Nothing is called until `connect`
    pub fn new(backend: ObjectRef) -> TaskService {
        TaskService { handle: backend }
    }

    /// Connect to a computer. Missing values use the local computer and the current user
    pub fn connect(
        &self,
        server: Option<&str>,
        user: Option<&str>,
        domain: Option<&str>,
        password: Option<&str>,
    ) -> Result<(), TaskError> {
        let method = Method::Connect {
            server: server.map(str::to_string),
            user: user.map(str::to_string),
            domain: domain.map(str::to_string),
            password: password.map(str::to_string),
        };
        if let Err(err) = self.handle.call(method) {
            error!("[service] Could not connect to task service: {err}");
            return Err(err.into());
        }
        info!(
            "[service] Connected to task service on {}",
            server.unwrap_or("local computer")
        );
        Ok(())
    }

    pub fn connected(&self) -> Result<bool, TaskError> {
        Ok(self.handle.boolean(Property::Connected)?)
    }

    pub fn connected_domain(&self) -> Result<String, TaskError> {
        Ok(self.handle.text(Property::ConnectedDomain)?)
    }

    pub fn connected_user(&self) -> Result<String, TaskError> {
        Ok(self.handle.text(Property::ConnectedUser)?)
    }

    /// Highest service version supported. Major version in the high 16 bits, minor in the low
    pub fn highest_version(&self) -> Result<u32, TaskError> {
        let version = self.handle.integer(Property::HighestVersion)?;
        match u32::try_from(version) {
            Ok(result) => Ok(result),
            Err(err) => {
                error!("[service] Unexpected service version {version}: {err:?}");
                Err(TaskError::UnexpectedValue)
            }
        }
    }

    /// Name of the computer the service runs on
    pub fn target_server(&self) -> Result<String, TaskError> {
        Ok(self.handle.text(Property::TargetServer)?)
    }

    pub fn get_folder(&self, path: &str) -> Result<TaskFolder, TaskError> {
        match self.handle.call(Method::GetFolder(path.to_string())) {
            Ok(reply) => Ok(TaskFolder::new(reply.into_object()?)),
            Err(err) => Err(map_not_found(err, TaskError::FolderNotFound, path)),
        }
    }

    /// Every running task instance. Hidden tasks are only listed when asked for
    pub fn get_running_tasks(
        &self,
        include_hidden: bool,
    ) -> Result<RunningTaskCollection, TaskError> {
        let flags = if include_hidden {
            EnumFlags::HIDDEN
        } else {
            EnumFlags::empty()
        };
        let reply = self
            .handle
            .call(Method::GetRunningTasks(flags.bits() as i32))?;
        Ok(RunningTaskCollection::new(reply.into_object()?))
    }

    /// Empty task definition with the service defaults, ready to fill in and register
    pub fn new_task(&self) -> Result<TaskDefinition, TaskError> {
        let reply = self.handle.call(Method::NewTask(0))?;
        Ok(TaskDefinition::new(reply.into_object()?))
    }
}

#[cfg(test)]
mod tests {
    use super::TaskService;
    use crate::{
        service::{error::SCHED_E_SERVICE_NOT_RUNNING, memory::memory_service},
        tasks::{error::TaskError, folder::RegisterOptions},
    };

    fn connected() -> TaskService {
        let service = TaskService::new(memory_service());
        service.connect(None, None, None, None).unwrap();
        service
    }

    #[test]
    fn test_connect() {
        let service = TaskService::new(memory_service());
        match service.new_task().unwrap_err() {
            TaskError::Service(err) => assert!(err.is(SCHED_E_SERVICE_NOT_RUNNING)),
            other => panic!("unexpected error {other:?}"),
        }

        service
            .connect(Some("fileserver"), Some("svc_tasks"), Some("CORP"), None)
            .unwrap();
        assert!(service.connected().unwrap());
        assert_eq!(service.target_server().unwrap(), "fileserver");
        assert_eq!(service.connected_user().unwrap(), "svc_tasks");
        assert_eq!(service.connected_domain().unwrap(), "CORP");
    }

    #[test]
    fn test_highest_version() {
        let version = connected().highest_version().unwrap();
        assert_eq!(version >> 16, 1);
        assert_eq!(version & 0xffff, 6);
    }

    #[test]
    fn test_get_folder() {
        let service = connected();
        let root = service.get_folder("\\").unwrap();
        assert_eq!(root.path().unwrap(), "\\");
        assert_eq!(
            service.get_folder("\\Missing").unwrap_err(),
            TaskError::FolderNotFound
        );
    }

    #[test]
    fn test_get_running_tasks() {
        let service = connected();
        let root = service.get_folder("\\").unwrap();

        let visible = service.new_task().unwrap();
        root.register_task_definition(Some("Visible"), &visible, &RegisterOptions::default())
            .unwrap()
            .run(None)
            .unwrap();

        let hidden = service.new_task().unwrap();
        hidden.settings().unwrap().set_hidden(true).unwrap();
        root.register_task_definition(Some("Hidden"), &hidden, &RegisterOptions::default())
            .unwrap()
            .run(None)
            .unwrap();

        assert_eq!(service.get_running_tasks(false).unwrap().len().unwrap(), 1);
        assert_eq!(service.get_running_tasks(true).unwrap().len().unwrap(), 2);
    }
}
