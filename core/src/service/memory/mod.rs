/**
 * A task scheduling service that lives entirely in memory.
 *
 * It answers the same properties and methods as the real service and reports the same status codes for missing,
 * duplicate and out of range objects. Tasks are stored and their runs are recorded but nothing is ever executed
 */
mod bag;
mod folder;
mod registered;

use self::{
    bag::{listing, new_definition},
    folder::MemoryFolder,
};
use super::{
    error::{ServiceError, DISP_E_MEMBERNOTFOUND, ERROR_FILE_NOT_FOUND, SCHED_E_SERVICE_NOT_RUNNING},
    object::{Method, ObjectRef, Property, Reply, ServiceObject, Variant},
};
use common::flags::EnumFlags;
use log::info;
use std::{cell::RefCell, rc::Rc};

/// Version 1.6 split on the 16 bit boundary
const HIGHEST_VERSION: i64 = (1 << 16) | 6;
const DEFAULT_SERVER: &str = "localhost";
const DEFAULT_USER: &str = "User";
const DEFAULT_DOMAIN: &str = "WORKGROUP";

#[derive(Debug)]
struct Session {
    server: String,
    user: String,
    domain: String,
}

/// Entry point object of the memory service
#[derive(Debug)]
pub struct MemoryService {
    root: Rc<MemoryFolder>,
    session: RefCell<Option<Session>>,
}

impl MemoryService {
    fn session_value(&self, read: fn(&Session) -> &String) -> Result<Variant, ServiceError> {
        match self.session.borrow().as_ref() {
            Some(session) => Ok(Variant::Text(read(session).clone())),
            None => Err(not_connected()),
        }
    }

    fn require_connection(&self) -> Result<(), ServiceError> {
        if self.session.borrow().is_none() {
            return Err(not_connected());
        }
        Ok(())
    }
}

fn not_connected() -> ServiceError {
    ServiceError::new(SCHED_E_SERVICE_NOT_RUNNING, "Connect has not been called")
}

/// Create a disconnected memory service with an empty root folder
pub fn memory_service() -> ObjectRef {
    Rc::new(MemoryService {
        root: MemoryFolder::root(),
        session: RefCell::new(None),
    })
}

impl ServiceObject for MemoryService {
    fn get(&self, property: Property) -> Result<Variant, ServiceError> {
        match property {
            Property::Connected => Ok(Variant::Bool(self.session.borrow().is_some())),
            Property::HighestVersion => Ok(Variant::Int(HIGHEST_VERSION)),
            Property::TargetServer => self.session_value(|session| &session.server),
            Property::ConnectedUser => self.session_value(|session| &session.user),
            Property::ConnectedDomain => self.session_value(|session| &session.domain),
            _ => Err(ServiceError::new(
                DISP_E_MEMBERNOTFOUND,
                &format!("The service has no {property:?}"),
            )),
        }
    }

    fn put(&self, property: Property, _value: Variant) -> Result<(), ServiceError> {
        Err(ServiceError::new(
            DISP_E_MEMBERNOTFOUND,
            &format!("Service {property:?} is read only"),
        ))
    }

    fn get_object(&self, property: Property) -> Result<ObjectRef, ServiceError> {
        Err(ServiceError::new(
            DISP_E_MEMBERNOTFOUND,
            &format!("The service has no {property:?}"),
        ))
    }

    fn put_object(&self, property: Property, _value: ObjectRef) -> Result<(), ServiceError> {
        Err(ServiceError::new(
            DISP_E_MEMBERNOTFOUND,
            &format!("The service has no {property:?}"),
        ))
    }

    fn call(&self, method: Method) -> Result<Reply, ServiceError> {
        match method {
            Method::Connect {
                server,
                user,
                domain,
                ..
            } => {
                let session = Session {
                    server: server.unwrap_or_else(|| DEFAULT_SERVER.to_string()),
                    user: user.unwrap_or_else(|| DEFAULT_USER.to_string()),
                    domain: domain.unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
                };
                info!(
                    "[service] Connected to {} as {}\\{}",
                    session.server, session.domain, session.user
                );
                *self.session.borrow_mut() = Some(session);
                Ok(Reply::Unit)
            }
            Method::GetFolder(path) => {
                self.require_connection()?;
                match self.root.resolve(&path)? {
                    Some(folder) => Ok(Reply::Object(folder)),
                    None => Err(ServiceError::new(
                        ERROR_FILE_NOT_FOUND,
                        &format!("Folder {path:?} does not exist"),
                    )),
                }
            }
            Method::GetRunningTasks(flags) => {
                self.require_connection()?;
                let include_hidden =
                    EnumFlags::from_bits(flags as u32).contains(EnumFlags::HIDDEN);
                let running = self.root.running(include_hidden)?;
                Ok(Reply::Object(Rc::new(listing(running))))
            }
            Method::NewTask(_) => {
                self.require_connection()?;
                Ok(Reply::Object(Rc::new(new_definition())))
            }
            method => Err(ServiceError::new(
                DISP_E_MEMBERNOTFOUND,
                &format!("The service does not support {method:?}"),
            )),
        }
    }
}
