use super::{
    bag::{listing, new_definition},
    registered::MemoryTask,
};
use crate::service::{
    error::{
        ServiceError, DISP_E_MEMBERNOTFOUND, E_ACCESSDENIED, E_INVALIDARG, ERROR_ALREADY_EXISTS,
        ERROR_DIR_NOT_EMPTY, ERROR_FILE_NOT_FOUND, ERROR_PATH_NOT_FOUND,
    },
    object::{Method, ObjectRef, Property, Reply, ServiceObject, Variant},
};
use common::flags::{CreationFlags, EnumFlags};
use log::debug;
use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::{Rc, Weak},
};
use uuid::Uuid;

/// Folder in the memory task tree. Names are matched case insensitively like the service does
#[derive(Debug)]
pub struct MemoryFolder {
    name: String,
    path: String,
    this: Weak<MemoryFolder>,
    root: Weak<MemoryFolder>,
    sddl: RefCell<String>,
    folders: RefCell<BTreeMap<String, Rc<MemoryFolder>>>,
    tasks: RefCell<BTreeMap<String, Rc<MemoryTask>>>,
}

/// Options for a task registration
struct Registration {
    path: Option<String>,
    definition: ObjectRef,
    flags: CreationFlags,
    user: Option<String>,
    logon_type: i32,
    sddl: Option<String>,
}

impl MemoryFolder {
    /// The `\` folder every path resolves from
    pub(crate) fn root() -> Rc<MemoryFolder> {
        Rc::new_cyclic(|this| MemoryFolder {
            name: String::from("\\"),
            path: String::from("\\"),
            this: this.clone(),
            root: this.clone(),
            sddl: RefCell::new(String::new()),
            folders: RefCell::new(BTreeMap::new()),
            tasks: RefCell::new(BTreeMap::new()),
        })
    }

    fn child_path(&self, name: &str) -> String {
        if self.path == "\\" {
            return format!("\\{name}");
        }
        format!("{}\\{name}", self.path)
    }

    fn add_folder(&self, name: &str) -> Rc<MemoryFolder> {
        let folder = Rc::new_cyclic(|this| MemoryFolder {
            name: name.to_string(),
            path: self.child_path(name),
            this: this.clone(),
            root: self.root.clone(),
            sddl: RefCell::new(String::new()),
            folders: RefCell::new(BTreeMap::new()),
            tasks: RefCell::new(BTreeMap::new()),
        });
        self.folders
            .borrow_mut()
            .insert(name.to_lowercase(), folder.clone());
        folder
    }

    /// Folder the path starts from: the root for absolute paths, otherwise this folder
    fn origin(&self, path: &str) -> Result<Rc<MemoryFolder>, ServiceError> {
        let origin = if path.starts_with('\\') {
            self.root.upgrade()
        } else {
            self.this.upgrade()
        };
        origin.ok_or_else(|| ServiceError::new(E_ACCESSDENIED, "Folder tree was dropped"))
    }

    /// Walk a folder path, absolute or relative to this folder
    pub(crate) fn resolve(&self, path: &str) -> Result<Option<Rc<MemoryFolder>>, ServiceError> {
        let mut folder = self.origin(path)?;
        for segment in segments(path) {
            let next = folder.folders.borrow().get(&segment.to_lowercase()).cloned();
            folder = match next {
                Some(result) => result,
                None => return Ok(None),
            };
        }
        Ok(Some(folder))
    }

    /// Split a path into its parent folder and final name
    fn parent_of<'a>(&self, path: &'a str) -> Result<(Rc<MemoryFolder>, &'a str), ServiceError> {
        let mut parts = segments(path);
        let leaf = match parts.pop() {
            Some(result) => result,
            None => {
                return Err(ServiceError::new(
                    E_INVALIDARG,
                    &format!("Path {path:?} has no name"),
                ))
            }
        };

        let mut folder = self.origin(path)?;
        for segment in parts {
            let next = folder.folders.borrow().get(&segment.to_lowercase()).cloned();
            folder = match next {
                Some(result) => result,
                None => {
                    return Err(ServiceError::new(
                        ERROR_PATH_NOT_FOUND,
                        &format!("Folder {segment:?} in {path:?} does not exist"),
                    ))
                }
            };
        }
        Ok((folder, leaf))
    }

    fn create_folder(&self, name: &str, sddl: Option<String>) -> Result<Reply, ServiceError> {
        let parts = segments(name);
        if parts.is_empty() {
            return Err(ServiceError::new(E_INVALIDARG, "Folder name is empty"));
        }

        let mut folder = self.origin(name)?;
        let last = parts.len() - 1;
        for (index, segment) in parts.into_iter().enumerate() {
            let existing = folder.folders.borrow().get(&segment.to_lowercase()).cloned();
            folder = match existing {
                Some(_) if index == last => {
                    return Err(ServiceError::new(
                        ERROR_ALREADY_EXISTS,
                        &format!("Folder {name:?} already exists"),
                    ))
                }
                Some(result) => result,
                None => folder.add_folder(segment),
            };
        }

        if let Some(descriptor) = sddl {
            *folder.sddl.borrow_mut() = descriptor;
        }
        debug!("[service] Created folder {}", folder.path);
        Ok(Reply::Object(folder))
    }

    fn delete_folder(&self, name: &str) -> Result<Reply, ServiceError> {
        let (parent, leaf) = self.parent_of(name)?;
        let key = leaf.to_lowercase();
        let folder = match parent.folders.borrow().get(&key).cloned() {
            Some(result) => result,
            None => {
                return Err(ServiceError::new(
                    ERROR_FILE_NOT_FOUND,
                    &format!("Folder {name:?} does not exist"),
                ))
            }
        };

        if !folder.folders.borrow().is_empty() || !folder.tasks.borrow().is_empty() {
            return Err(ServiceError::new(
                ERROR_DIR_NOT_EMPTY,
                &format!("Folder {name:?} is not empty"),
            ));
        }
        parent.folders.borrow_mut().remove(&key);
        Ok(Reply::Unit)
    }

    fn find_task(&self, path: &str) -> Result<Rc<MemoryTask>, ServiceError> {
        let (parent, leaf) = self.parent_of(path)?;
        let task = parent.tasks.borrow().get(&leaf.to_lowercase()).cloned();
        task.ok_or_else(|| {
            ServiceError::new(
                ERROR_FILE_NOT_FOUND,
                &format!("Task {path:?} does not exist"),
            )
        })
    }

    fn delete_task(&self, path: &str) -> Result<Reply, ServiceError> {
        let (parent, leaf) = self.parent_of(path)?;
        let removed = parent.tasks.borrow_mut().remove(&leaf.to_lowercase());
        match removed {
            Some(_) => Ok(Reply::Unit),
            None => Err(ServiceError::new(
                ERROR_FILE_NOT_FOUND,
                &format!("Task {path:?} does not exist"),
            )),
        }
    }

    fn register(&self, registration: Registration) -> Result<Reply, ServiceError> {
        // The service names unnamed tasks with a GUID
        let path = registration
            .path
            .unwrap_or_else(|| format!("{{{}}}", Uuid::new_v4().hyphenated()).to_uppercase());
        let (parent, leaf) = self.parent_of(&path)?;
        let key = leaf.to_lowercase();
        let flags = registration.flags;

        let exists = parent.tasks.borrow().contains_key(&key);
        if exists && !flags.contains(CreationFlags::UPDATE) {
            return Err(ServiceError::new(
                ERROR_ALREADY_EXISTS,
                &format!("Task {path:?} already exists"),
            ));
        }
        if !exists && !flags.contains(CreationFlags::CREATE) {
            return Err(ServiceError::new(
                ERROR_FILE_NOT_FOUND,
                &format!("Task {path:?} does not exist"),
            ));
        }

        let principal = registration.definition.get_object(Property::Principal)?;
        if let Some(user) = registration.user.as_deref() {
            principal.put_text(Property::UserId, user)?;
        }
        principal.put_int(Property::LogonType, registration.logon_type as i64)?;

        let task = Rc::new(MemoryTask::new(
            leaf,
            &parent.child_path(leaf),
            registration.definition,
            registration.sddl.as_deref().unwrap_or_default(),
        ));
        if flags.contains(CreationFlags::DISABLE) {
            task.set_enabled(false)?;
        }
        if flags.contains(CreationFlags::VALIDATE_ONLY) {
            return Ok(Reply::Object(task));
        }

        parent.tasks.borrow_mut().insert(key, task.clone());
        debug!("[service] Registered task {path}");
        Ok(Reply::Object(task))
    }

    /// Running instances of every task at or below this folder
    pub(crate) fn running(&self, include_hidden: bool) -> Result<Vec<ObjectRef>, ServiceError> {
        let mut running = Vec::new();
        for task in self.tasks.borrow().values() {
            if !include_hidden && task.hidden()? {
                continue;
            }
            running.append(&mut task.running()?);
        }
        for folder in self.folders.borrow().values() {
            running.append(&mut folder.running(include_hidden)?);
        }
        Ok(running)
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('\\')
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn include_hidden(flags: i32) -> bool {
    EnumFlags::from_bits(flags as u32).contains(EnumFlags::HIDDEN)
}

impl ServiceObject for MemoryFolder {
    fn get(&self, property: Property) -> Result<Variant, ServiceError> {
        match property {
            Property::Name => Ok(Variant::Text(self.name.clone())),
            Property::Path => Ok(Variant::Text(self.path.clone())),
            _ => Err(ServiceError::new(
                DISP_E_MEMBERNOTFOUND,
                &format!("Folders have no {property:?}"),
            )),
        }
    }

    fn put(&self, property: Property, _value: Variant) -> Result<(), ServiceError> {
        Err(ServiceError::new(
            DISP_E_MEMBERNOTFOUND,
            &format!("Folder {property:?} is read only"),
        ))
    }

    fn get_object(&self, property: Property) -> Result<ObjectRef, ServiceError> {
        Err(ServiceError::new(
            DISP_E_MEMBERNOTFOUND,
            &format!("Folders have no {property:?}"),
        ))
    }

    fn put_object(&self, property: Property, _value: ObjectRef) -> Result<(), ServiceError> {
        Err(ServiceError::new(
            DISP_E_MEMBERNOTFOUND,
            &format!("Folders have no {property:?}"),
        ))
    }

    fn call(&self, method: Method) -> Result<Reply, ServiceError> {
        match method {
            Method::CreateFolder { name, sddl } => self.create_folder(&name, sddl),
            Method::DeleteFolder { name, .. } => self.delete_folder(&name),
            Method::DeleteTask { name, .. } => self.delete_task(&name),
            Method::GetFolder(path) => match self.resolve(&path)? {
                Some(folder) => Ok(Reply::Object(folder)),
                None => Err(ServiceError::new(
                    ERROR_FILE_NOT_FOUND,
                    &format!("Folder {path:?} does not exist"),
                )),
            },
            Method::GetFolders(_) => {
                let folders = self
                    .folders
                    .borrow()
                    .values()
                    .map(|folder| folder.clone() as ObjectRef)
                    .collect();
                Ok(Reply::Object(Rc::new(listing(folders))))
            }
            Method::GetTask(path) => Ok(Reply::Object(self.find_task(&path)?)),
            Method::GetTasks(flags) => {
                let mut tasks: Vec<ObjectRef> = Vec::new();
                for task in self.tasks.borrow().values() {
                    if include_hidden(flags) || !task.hidden()? {
                        tasks.push(task.clone());
                    }
                }
                Ok(Reply::Object(Rc::new(listing(tasks))))
            }
            Method::GetSecurityDescriptor(_) => {
                Ok(Reply::Value(Variant::Text(self.sddl.borrow().clone())))
            }
            Method::SetSecurityDescriptor { sddl, .. } => {
                *self.sddl.borrow_mut() = sddl;
                Ok(Reply::Unit)
            }
            Method::RegisterTask {
                path,
                xml,
                flags,
                user,
                logon_type,
                sddl,
                ..
            } => {
                let definition = new_definition();
                definition.put_text(Property::XmlText, &xml)?;
                self.register(Registration {
                    path,
                    definition: Rc::new(definition),
                    flags: CreationFlags::from_bits(flags),
                    user,
                    logon_type,
                    sddl,
                })
            }
            Method::RegisterTaskDefinition {
                path,
                definition,
                flags,
                user,
                logon_type,
                sddl,
                ..
            } => self.register(Registration {
                path,
                definition,
                flags: CreationFlags::from_bits(flags),
                user,
                logon_type,
                sddl,
            }),
            method => Err(ServiceError::new(
                DISP_E_MEMBERNOTFOUND,
                &format!("Folders do not support {method:?}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{include_hidden, segments, MemoryFolder};
    use crate::service::{
        error::{ERROR_ALREADY_EXISTS, ERROR_DIR_NOT_EMPTY, ERROR_FILE_NOT_FOUND},
        memory::bag::new_definition,
        object::{Method, ObjectRef, Property, ServiceObject},
    };
    use common::flags::CreationFlags;
    use std::rc::Rc;

    fn create(folder: &MemoryFolder, name: &str) -> ObjectRef {
        folder
            .call(Method::CreateFolder {
                name: name.to_string(),
                sddl: None,
            })
            .unwrap()
            .into_object()
            .unwrap()
    }

    fn register(folder: &MemoryFolder, path: &str, flags: CreationFlags) -> ObjectRef {
        folder
            .call(Method::RegisterTaskDefinition {
                path: Some(path.to_string()),
                definition: Rc::new(new_definition()),
                flags: flags.bits(),
                user: None,
                password: None,
                logon_type: 3,
                sddl: None,
            })
            .unwrap()
            .into_object()
            .unwrap()
    }

    #[test]
    fn test_segments() {
        assert_eq!(segments("\\Parent\\Child"), vec!["Parent", "Child"]);
        assert!(segments("\\").is_empty());
        assert!(include_hidden(1));
        assert!(!include_hidden(0));
    }

    #[test]
    fn test_create_folder_nested() {
        let root = MemoryFolder::root();
        let child = create(&root, "Parent\\Child");
        assert_eq!(child.text(Property::Name).unwrap(), "Child");
        assert_eq!(child.text(Property::Path).unwrap(), "\\Parent\\Child");

        let parent = root
            .call(Method::GetFolder(String::from("\\parent")))
            .unwrap()
            .into_object()
            .unwrap();
        assert_eq!(parent.text(Property::Path).unwrap(), "\\Parent");
    }

    #[test]
    fn test_create_folder_relative_and_absolute() {
        let root = MemoryFolder::root();
        let parent = create(&root, "\\Parent");
        let relative = create(&*parent_folder(&root, "Parent"), "Relative");
        assert_eq!(relative.text(Property::Path).unwrap(), "\\Parent\\Relative");

        let absolute = parent
            .call(Method::CreateFolder {
                name: String::from("\\Absolute"),
                sddl: None,
            })
            .unwrap()
            .into_object()
            .unwrap();
        assert_eq!(absolute.text(Property::Path).unwrap(), "\\Absolute");
    }

    fn parent_folder(root: &MemoryFolder, path: &str) -> Rc<MemoryFolder> {
        root.resolve(path).unwrap().unwrap()
    }

    #[test]
    fn test_create_folder_exists() {
        let root = MemoryFolder::root();
        create(&root, "Parent");
        let err = root
            .call(Method::CreateFolder {
                name: String::from("PARENT"),
                sddl: None,
            })
            .unwrap_err();
        assert_eq!(err.code, ERROR_ALREADY_EXISTS);
    }

    #[test]
    fn test_delete_folder() {
        let root = MemoryFolder::root();
        create(&root, "Parent\\Child");

        let err = root
            .call(Method::DeleteFolder {
                name: String::from("Parent"),
                flags: 0,
            })
            .unwrap_err();
        assert_eq!(err.code, ERROR_DIR_NOT_EMPTY);

        root.call(Method::DeleteFolder {
            name: String::from("\\Parent\\Child"),
            flags: 0,
        })
        .unwrap();
        root.call(Method::DeleteFolder {
            name: String::from("Parent"),
            flags: 0,
        })
        .unwrap();

        let err = root
            .call(Method::GetFolder(String::from("Parent")))
            .unwrap_err();
        assert_eq!(err.code, ERROR_FILE_NOT_FOUND);
    }

    #[test]
    fn test_register_flags() {
        let root = MemoryFolder::root();
        let task = register(&root, "Backup", CreationFlags::CREATE);
        assert_eq!(task.text(Property::Path).unwrap(), "\\Backup");

        let err = root
            .call(Method::RegisterTaskDefinition {
                path: Some(String::from("Backup")),
                definition: Rc::new(new_definition()),
                flags: CreationFlags::CREATE.bits(),
                user: None,
                password: None,
                logon_type: 3,
                sddl: None,
            })
            .unwrap_err();
        assert_eq!(err.code, ERROR_ALREADY_EXISTS);

        let updated = register(&root, "Backup", CreationFlags::CREATE_OR_UPDATE);
        assert_eq!(updated.text(Property::Name).unwrap(), "Backup");

        let disabled = register(&root, "Disabled", CreationFlags::CREATE | CreationFlags::DISABLE);
        assert!(!disabled.boolean(Property::Enabled).unwrap());
    }

    #[test]
    fn test_register_unnamed() {
        let root = MemoryFolder::root();
        let task = root
            .call(Method::RegisterTask {
                path: None,
                xml: String::from("<Task />"),
                flags: CreationFlags::CREATE.bits(),
                user: Some(String::from("svc_tasks")),
                password: None,
                logon_type: 5,
                sddl: None,
            })
            .unwrap()
            .into_object()
            .unwrap();
        assert!(task.text(Property::Name).unwrap().starts_with('{'));
        assert_eq!(task.text(Property::Xml).unwrap(), "<Task />");

        let principal = task
            .get_object(Property::Definition)
            .unwrap()
            .get_object(Property::Principal)
            .unwrap();
        assert_eq!(principal.text(Property::UserId).unwrap(), "svc_tasks");
        assert_eq!(principal.integer(Property::LogonType).unwrap(), 5);
    }

    #[test]
    fn test_get_tasks_hidden() {
        let root = MemoryFolder::root();
        let hidden = register(&root, "Hidden", CreationFlags::CREATE);
        hidden
            .get_object(Property::Definition)
            .unwrap()
            .get_object(Property::Settings)
            .unwrap()
            .put_bool(Property::Hidden, true)
            .unwrap();
        register(&root, "Visible", CreationFlags::CREATE);

        let visible = root.call(Method::GetTasks(0)).unwrap().into_object().unwrap();
        assert_eq!(visible.integer(Property::Count).unwrap(), 1);
        let all = root.call(Method::GetTasks(1)).unwrap().into_object().unwrap();
        assert_eq!(all.integer(Property::Count).unwrap(), 2);
    }

    #[test]
    fn test_delete_task() {
        let root = MemoryFolder::root();
        create(&root, "Jobs");
        register(&root, "\\Jobs\\Nightly", CreationFlags::CREATE);

        let jobs = parent_folder(&root, "Jobs");
        let task = jobs
            .call(Method::GetTask(String::from("Nightly")))
            .unwrap()
            .into_object()
            .unwrap();
        assert_eq!(task.text(Property::Path).unwrap(), "\\Jobs\\Nightly");

        jobs.call(Method::DeleteTask {
            name: String::from("Nightly"),
            flags: 0,
        })
        .unwrap();
        let err = jobs
            .call(Method::DeleteTask {
                name: String::from("Nightly"),
                flags: 0,
            })
            .unwrap_err();
        assert_eq!(err.code, ERROR_FILE_NOT_FOUND);
    }
}
