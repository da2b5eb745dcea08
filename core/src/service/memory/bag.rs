use crate::service::{
    error::{ServiceError, DISP_E_BADINDEX, DISP_E_MEMBERNOTFOUND, E_INVALIDARG},
    object::{Method, ObjectRef, Property, Reply, ServiceObject, Variant},
};
use common::windows::{ActionKind, TaskState, TriggerKind};
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};
use uuid::Uuid;

/// Which service object a bag stands in for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Class {
    Definition,
    RegistrationInfo,
    Principal,
    Settings,
    IdleSettings,
    NetworkSettings,
    Actions,
    Action,
    Triggers,
    Trigger,
    Repetition,
    NamedValues,
    NamedValue,
    RunningTask,
    /// Read only snapshot of folders, tasks or running tasks
    Listing,
}

impl Class {
    fn is_collection(&self) -> bool {
        matches!(
            self,
            Class::Actions | Class::Triggers | Class::NamedValues | Class::Listing
        )
    }
}

/// Property bag standing in for the plain data objects of the service
#[derive(Debug)]
pub struct MemoryObject {
    class: Class,
    values: RefCell<BTreeMap<Property, Variant>>,
    children: RefCell<BTreeMap<Property, ObjectRef>>,
    items: RefCell<Vec<ObjectRef>>,
}

impl MemoryObject {
    pub(crate) fn new(class: Class) -> MemoryObject {
        MemoryObject {
            class,
            values: RefCell::new(BTreeMap::new()),
            children: RefCell::new(BTreeMap::new()),
            items: RefCell::new(Vec::new()),
        }
    }

    fn with(mut self, property: Property, value: Variant) -> MemoryObject {
        self.values.get_mut().insert(property, value);
        self
    }

    fn with_child(mut self, property: Property, child: MemoryObject) -> MemoryObject {
        self.children.get_mut().insert(property, Rc::new(child));
        self
    }

    fn index(&self, index: i32) -> Result<usize, ServiceError> {
        let len = self.items.borrow().len();
        match usize::try_from(index) {
            Ok(value) if value >= 1 && value <= len => Ok(value - 1),
            _ => Err(ServiceError::new(
                DISP_E_BADINDEX,
                &format!("Index {index} outside 1..={len}"),
            )),
        }
    }

    fn push(&self, item: MemoryObject) -> ObjectRef {
        let item: ObjectRef = Rc::new(item);
        self.items.borrow_mut().push(item.clone());
        item
    }

    fn unsupported(&self, what: &str) -> ServiceError {
        ServiceError::new(
            DISP_E_MEMBERNOTFOUND,
            &format!("{what} is not supported by {:?}", self.class),
        )
    }
}

impl ServiceObject for MemoryObject {
    fn get(&self, property: Property) -> Result<Variant, ServiceError> {
        if property == Property::Count && self.class.is_collection() {
            return Ok(Variant::Int(self.items.borrow().len() as i64));
        }
        Ok(self
            .values
            .borrow()
            .get(&property)
            .cloned()
            .unwrap_or_default())
    }

    fn put(&self, property: Property, value: Variant) -> Result<(), ServiceError> {
        match property {
            Property::Type | Property::Count => {
                Err(self.unsupported(&format!("Writing {property:?}")))
            }
            _ if self.class == Class::Listing || self.class == Class::RunningTask => {
                Err(self.unsupported(&format!("Writing {property:?}")))
            }
            _ => {
                self.values.borrow_mut().insert(property, value);
                Ok(())
            }
        }
    }

    fn get_object(&self, property: Property) -> Result<ObjectRef, ServiceError> {
        match self.children.borrow().get(&property) {
            Some(child) => Ok(child.clone()),
            None => Err(self.unsupported(&format!("Object {property:?}"))),
        }
    }

    fn put_object(&self, property: Property, value: ObjectRef) -> Result<(), ServiceError> {
        if !self.children.borrow().contains_key(&property) {
            return Err(self.unsupported(&format!("Object {property:?}")));
        }
        self.children.borrow_mut().insert(property, value);
        Ok(())
    }

    fn call(&self, method: Method) -> Result<Reply, ServiceError> {
        match (self.class, method) {
            (class, Method::Item(index)) if class.is_collection() => {
                let position = self.index(index)?;
                Ok(Reply::Object(self.items.borrow()[position].clone()))
            }
            (class, Method::Items) if class.is_collection() => {
                Ok(Reply::Objects(self.items.borrow().clone()))
            }
            (Class::Actions, Method::Create(kind)) => {
                Ok(Reply::Object(self.push(new_action(kind)?)))
            }
            (Class::Triggers, Method::Create(kind)) => {
                Ok(Reply::Object(self.push(new_trigger(kind)?)))
            }
            (Class::NamedValues, Method::CreatePair { name, value }) => {
                let pair = MemoryObject::new(Class::NamedValue)
                    .with(Property::Name, Variant::Text(name))
                    .with(Property::Value, Variant::Text(value));
                Ok(Reply::Object(self.push(pair)))
            }
            (Class::Actions | Class::Triggers | Class::NamedValues, Method::Remove(index)) => {
                let position = self.index(index)?;
                self.items.borrow_mut().remove(position);
                Ok(Reply::Unit)
            }
            (Class::Actions | Class::Triggers | Class::NamedValues, Method::Clear) => {
                self.items.borrow_mut().clear();
                Ok(Reply::Unit)
            }
            (Class::RunningTask, Method::Stop(_)) => {
                self.values
                    .borrow_mut()
                    .insert(Property::State, Variant::Int(TaskState::Ready.as_raw() as i64));
                Ok(Reply::Unit)
            }
            (Class::RunningTask, Method::Refresh) => Ok(Reply::Unit),
            (_, method) => Err(self.unsupported(&format!("{method:?}"))),
        }
    }
}

/// Fresh task definition with the defaults the service applies to new tasks
pub(crate) fn new_definition() -> MemoryObject {
    let idle = MemoryObject::new(Class::IdleSettings)
        .with(Property::IdleDuration, text("PT10M"))
        .with(Property::WaitTimeout, text("PT1H"))
        .with(Property::StopOnIdleEnd, Variant::Bool(true))
        .with(Property::RestartOnIdle, Variant::Bool(false));

    let settings = MemoryObject::new(Class::Settings)
        .with(Property::AllowDemandStart, Variant::Bool(true))
        .with(Property::AllowHardTerminate, Variant::Bool(true))
        .with(Property::Compatibility, Variant::Int(2))
        .with(Property::DisallowStartIfOnBatteries, Variant::Bool(true))
        .with(Property::StopIfGoingOnBatteries, Variant::Bool(true))
        .with(Property::Enabled, Variant::Bool(true))
        .with(Property::ExecutionTimeLimit, text("PT72H"))
        .with(Property::MultipleInstances, Variant::Int(2))
        .with(Property::Priority, Variant::Int(7))
        .with_child(Property::IdleSettings, idle)
        .with_child(
            Property::NetworkSettings,
            MemoryObject::new(Class::NetworkSettings),
        );

    let principal = MemoryObject::new(Class::Principal)
        .with(Property::LogonType, Variant::Int(3))
        .with(Property::RunLevel, Variant::Int(0));

    MemoryObject::new(Class::Definition)
        .with_child(
            Property::RegistrationInfo,
            MemoryObject::new(Class::RegistrationInfo),
        )
        .with_child(Property::Principal, principal)
        .with_child(Property::Settings, settings)
        .with_child(Property::Actions, MemoryObject::new(Class::Actions))
        .with_child(Property::Triggers, MemoryObject::new(Class::Triggers))
}

fn new_action(kind: i32) -> Result<MemoryObject, ServiceError> {
    let action_kind = match ActionKind::try_from(kind) {
        Ok(result) => result,
        Err(raw) => {
            return Err(ServiceError::new(
                E_INVALIDARG,
                &format!("Unknown action type {raw}"),
            ))
        }
    };

    let action = MemoryObject::new(Class::Action).with(Property::Type, Variant::Int(kind as i64));
    if action_kind == ActionKind::SendEmail {
        return Ok(action.with_child(
            Property::HeaderFields,
            MemoryObject::new(Class::NamedValues),
        ));
    }
    Ok(action)
}

fn new_trigger(kind: i32) -> Result<MemoryObject, ServiceError> {
    let trigger_kind = match TriggerKind::try_from(kind) {
        Ok(TriggerKind::Custom) | Err(_) => {
            return Err(ServiceError::new(
                E_INVALIDARG,
                &format!("Cannot create trigger type {kind}"),
            ))
        }
        Ok(result) => result,
    };

    let repetition = MemoryObject::new(Class::Repetition)
        .with(Property::StopAtDurationEnd, Variant::Bool(false));
    let trigger = MemoryObject::new(Class::Trigger)
        .with(Property::Type, Variant::Int(kind as i64))
        .with(Property::Enabled, Variant::Bool(true))
        .with_child(Property::Repetition, repetition);

    let trigger = match trigger_kind {
        TriggerKind::Event => {
            trigger.with_child(Property::ValueQueries, MemoryObject::new(Class::NamedValues))
        }
        TriggerKind::Daily => trigger.with(Property::DaysInterval, Variant::Int(1)),
        TriggerKind::Weekly => trigger.with(Property::WeeksInterval, Variant::Int(1)),
        TriggerKind::SessionStateChange => trigger.with(Property::StateChange, Variant::Int(1)),
        _ => trigger,
    };
    Ok(trigger)
}

/// Bookkeeping record for one run of a registered task
pub(crate) fn new_running_task(name: &str, path: &str, current_action: &str) -> MemoryObject {
    MemoryObject::new(Class::RunningTask)
        .with(Property::Name, text(name))
        .with(Property::Path, text(path))
        .with(Property::CurrentAction, text(current_action))
        .with(
            Property::InstanceGuid,
            text(&format!("{{{}}}", Uuid::new_v4().hyphenated()).to_uppercase()),
        )
        .with(Property::EnginePid, Variant::Int(std::process::id() as i64))
        .with(
            Property::State,
            Variant::Int(TaskState::Running.as_raw() as i64),
        )
}

/// Read only collection over existing objects
pub(crate) fn listing(items: Vec<ObjectRef>) -> MemoryObject {
    let listing = MemoryObject::new(Class::Listing);
    *listing.items.borrow_mut() = items;
    listing
}

fn text(value: &str) -> Variant {
    Variant::Text(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::{listing, new_definition, new_running_task, Class, MemoryObject};
    use crate::service::{
        error::{DISP_E_BADINDEX, DISP_E_MEMBERNOTFOUND, E_INVALIDARG},
        object::{Method, ObjectRef, Property, ServiceObject, Variant},
    };
    use std::rc::Rc;

    #[test]
    fn test_new_definition() {
        let definition = new_definition();
        let settings = definition.get_object(Property::Settings).unwrap();
        assert!(settings.boolean(Property::Enabled).unwrap());
        assert_eq!(settings.integer(Property::Priority).unwrap(), 7);
        assert_eq!(settings.text(Property::ExecutionTimeLimit).unwrap(), "PT72H");

        let idle = settings.get_object(Property::IdleSettings).unwrap();
        assert_eq!(idle.text(Property::WaitTimeout).unwrap(), "PT1H");

        let actions = definition.get_object(Property::Actions).unwrap();
        assert_eq!(actions.integer(Property::Count).unwrap(), 0);
    }

    #[test]
    fn test_create_action() {
        let definition = new_definition();
        let actions = definition.get_object(Property::Actions).unwrap();
        let action = actions
            .call(Method::Create(6))
            .unwrap()
            .into_object()
            .unwrap();
        assert_eq!(action.integer(Property::Type).unwrap(), 6);
        assert!(action.get_object(Property::HeaderFields).is_ok());
        assert_eq!(actions.integer(Property::Count).unwrap(), 1);
    }

    #[test]
    fn test_create_unknown_kind() {
        let definition = new_definition();
        let actions = definition.get_object(Property::Actions).unwrap();
        let err = actions.call(Method::Create(3)).unwrap_err();
        assert_eq!(err.code, E_INVALIDARG);

        let triggers = definition.get_object(Property::Triggers).unwrap();
        let err = triggers.call(Method::Create(12)).unwrap_err();
        assert_eq!(err.code, E_INVALIDARG);
    }

    #[test]
    fn test_item_one_based() {
        let definition = new_definition();
        let triggers = definition.get_object(Property::Triggers).unwrap();
        triggers.call(Method::Create(8)).unwrap();
        triggers.call(Method::Create(9)).unwrap();

        let second = triggers.call(Method::Item(2)).unwrap().into_object().unwrap();
        assert_eq!(second.integer(Property::Type).unwrap(), 9);

        assert_eq!(
            triggers.call(Method::Item(0)).unwrap_err().code,
            DISP_E_BADINDEX
        );
        assert_eq!(
            triggers.call(Method::Item(3)).unwrap_err().code,
            DISP_E_BADINDEX
        );

        triggers.call(Method::Remove(1)).unwrap();
        let first = triggers.call(Method::Item(1)).unwrap().into_object().unwrap();
        assert_eq!(first.integer(Property::Type).unwrap(), 9);

        triggers.call(Method::Clear).unwrap();
        assert_eq!(triggers.integer(Property::Count).unwrap(), 0);
    }

    #[test]
    fn test_type_is_read_only() {
        let definition = new_definition();
        let actions = definition.get_object(Property::Actions).unwrap();
        let action = actions.call(Method::Create(0)).unwrap().into_object().unwrap();
        let err = action.put(Property::Type, Variant::Int(5)).unwrap_err();
        assert_eq!(err.code, DISP_E_MEMBERNOTFOUND);
    }

    #[test]
    fn test_running_task_stop() {
        let running = new_running_task("Backup", "\\Backup", "copy");
        assert_eq!(running.integer(Property::State).unwrap(), 4);
        assert!(running.text(Property::InstanceGuid).unwrap().starts_with('{'));

        running.call(Method::Stop(0)).unwrap();
        assert_eq!(running.integer(Property::State).unwrap(), 3);
    }

    #[test]
    fn test_listing() {
        let folder: ObjectRef = Rc::new(MemoryObject::new(Class::NamedValue));
        let list = listing(vec![folder.clone(), folder]);
        assert_eq!(list.class, Class::Listing);
        assert_eq!(list.integer(Property::Count).unwrap(), 2);
        assert!(list.call(Method::Clear).is_err());
    }
}
