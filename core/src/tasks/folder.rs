/**
 * Task folders hold registered tasks and other folders.
 *
 * Paths starting with `\` are resolved from the root folder, anything else from the folder the call is made on.
 * Service failures that mean "missing" or "already there" are turned into typed errors, everything else keeps
 * the service status code.
 *
 * References:
 * `https://learn.microsoft.com/en-us/windows/win32/taskschd/taskfolder`
 */
use super::{
    collection,
    definition::TaskDefinition,
    error::{map_exists, map_not_found, TaskError},
    registered::{RegisteredTask, RegisteredTaskCollection},
};
use crate::service::object::{Method, ObjectRef, Property, Variant};
use common::{
    flags::{CreationFlags, EnumFlags, SecurityInformation},
    windows::LogonType,
};
use log::{debug, error};

/// Credentials and flags used when registering a task
#[derive(Debug, Clone)]
pub struct RegisterOptions {
    pub flags: CreationFlags,
    /// Overrides the user of the definition's principal
    pub user: Option<String>,
    pub password: Option<String>,
    pub logon_type: LogonType,
    pub sddl: Option<String>,
}

impl Default for RegisterOptions {
    fn default() -> RegisterOptions {
        RegisterOptions {
            flags: CreationFlags::CREATE_OR_UPDATE,
            user: None,
            password: None,
            logon_type: LogonType::InteractiveToken,
            sddl: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskFolder {
    handle: ObjectRef,
}

impl PartialEq for TaskFolder {
    /// Folders are the same when their paths are
    fn eq(&self, other: &TaskFolder) -> bool {
        match (self.path(), other.path()) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }
}

impl TaskFolder {
    pub(crate) fn new(handle: ObjectRef) -> TaskFolder {
        TaskFolder { handle }
    }

    pub fn name(&self) -> Result<String, TaskError> {
        Ok(self.handle.text(Property::Name)?)
    }

    /// Full path of the folder. The root folder is `\`
    pub fn path(&self) -> Result<String, TaskError> {
        Ok(self.handle.text(Property::Path)?)
    }

    /// Create a folder. Missing folders along the path are created too
    pub fn create_folder(&self, name: &str, sddl: Option<&str>) -> Result<TaskFolder, TaskError> {
        let method = Method::CreateFolder {
            name: name.to_string(),
            sddl: sddl.map(str::to_string),
        };
        let reply = match self.handle.call(method) {
            Ok(result) => result,
            Err(err) => return Err(map_exists(err, TaskError::FolderExists, name)),
        };
        debug!("[folder] Created folder {name}");
        Ok(TaskFolder::new(reply.into_object()?))
    }

    /// Delete an empty folder
    pub fn delete_folder(&self, name: &str) -> Result<(), TaskError> {
        let method = Method::DeleteFolder {
            name: name.to_string(),
            flags: 0,
        };
        match self.handle.call(method) {
            Ok(_) => Ok(()),
            Err(err) => Err(map_not_found(err, TaskError::FolderNotFound, name)),
        }
    }

    pub fn delete_task(&self, name: &str) -> Result<(), TaskError> {
        let method = Method::DeleteTask {
            name: name.to_string(),
            flags: 0,
        };
        match self.handle.call(method) {
            Ok(_) => Ok(()),
            Err(err) => Err(map_not_found(err, TaskError::TaskNotFound, name)),
        }
    }

    pub fn get_folder(&self, path: &str) -> Result<TaskFolder, TaskError> {
        match self.handle.call(Method::GetFolder(path.to_string())) {
            Ok(reply) => Ok(TaskFolder::new(reply.into_object()?)),
            Err(err) => Err(map_not_found(err, TaskError::FolderNotFound, path)),
        }
    }

    /// Folders directly below this one
    pub fn get_folders(&self) -> Result<TaskFolderCollection, TaskError> {
        let reply = self.handle.call(Method::GetFolders(0))?;
        Ok(TaskFolderCollection::new(reply.into_object()?))
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
                error!("[folder] Security descriptor came back as {other:?}");
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

    pub fn get_task(&self, path: &str) -> Result<RegisteredTask, TaskError> {
        match self.handle.call(Method::GetTask(path.to_string())) {
            Ok(reply) => Ok(RegisteredTask::new(reply.into_object()?)),
            Err(err) => Err(map_not_found(err, TaskError::TaskNotFound, path)),
        }
    }

    /// Tasks in this folder. Hidden tasks are only listed when asked for
    pub fn get_tasks(&self, include_hidden: bool) -> Result<RegisteredTaskCollection, TaskError> {
        let flags = if include_hidden {
            EnumFlags::HIDDEN
        } else {
            EnumFlags::empty()
        };
        let reply = self.handle.call(Method::GetTasks(flags.bits() as i32))?;
        Ok(RegisteredTaskCollection::new(reply.into_object()?))
    }

    /// Register a task from its XML. No path lets the service pick a GUID name
    pub fn register_task(
        &self,
        path: Option<&str>,
        xml: &str,
        options: &RegisterOptions,
    ) -> Result<RegisteredTask, TaskError> {
        let method = Method::RegisterTask {
            path: path.map(str::to_string),
            xml: xml.to_string(),
            flags: options.flags.bits(),
            user: options.user.clone(),
            password: options.password.clone(),
            logon_type: options.logon_type.as_raw(),
            sddl: options.sddl.clone(),
        };
        self.register(path, method)
    }

    /// Register a task from a definition built with the wrappers
    pub fn register_task_definition(
        &self,
        path: Option<&str>,
        definition: &TaskDefinition,
        options: &RegisterOptions,
    ) -> Result<RegisteredTask, TaskError> {
        let method = Method::RegisterTaskDefinition {
            path: path.map(str::to_string),
            definition: definition.handle().clone(),
            flags: options.flags.bits(),
            user: options.user.clone(),
            password: options.password.clone(),
            logon_type: options.logon_type.as_raw(),
            sddl: options.sddl.clone(),
        };
        self.register(path, method)
    }

    fn register(&self, path: Option<&str>, method: Method) -> Result<RegisteredTask, TaskError> {
        let name = path.unwrap_or("<unnamed>");
        let reply = match self.handle.call(method) {
            Ok(result) => result,
            Err(err) if err.is_not_found() => {
                return Err(map_not_found(err, TaskError::TaskNotFound, name))
            }
            Err(err) => return Err(map_exists(err, TaskError::TaskExists, name)),
        };
        debug!("[folder] Registered task {name}");
        Ok(RegisteredTask::new(reply.into_object()?))
    }
}

/// Read only list of folders
#[derive(Debug, Clone)]
pub struct TaskFolderCollection {
    handle: ObjectRef,
}

impl TaskFolderCollection {
    pub(crate) fn new(handle: ObjectRef) -> TaskFolderCollection {
        TaskFolderCollection { handle }
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

    pub fn item(&self, index: usize) -> Result<TaskFolder, TaskError> {
        Ok(TaskFolder::new(collection::item(&self.handle, index)?))
    }

    pub fn to_vec(&self) -> Result<Vec<TaskFolder>, TaskError> {
        let handles = collection::items(&self.handle)?;
        Ok(handles.into_iter().map(TaskFolder::new).collect())
    }

    pub fn iter(&self) -> Result<std::vec::IntoIter<TaskFolder>, TaskError> {
        Ok(self.to_vec()?.into_iter())
    }
}
