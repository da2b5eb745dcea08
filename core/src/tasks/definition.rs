use super::{
    actions::ActionCollection, error::TaskError, fields::read_text, principal::Principal,
    registration::RegistrationInfo, settings::TaskSettings, snapshot::snapshot_definition,
    triggers::TriggerCollection,
};
use crate::service::object::{ObjectRef, Property};
use common::windows::TaskSnapshot;
use log::error;

/// Every part of a task: its triggers, actions, settings, principal and registration details
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    handle: ObjectRef,
}

impl TaskDefinition {
    pub(crate) fn new(handle: ObjectRef) -> TaskDefinition {
        TaskDefinition { handle }
    }

    pub(crate) fn handle(&self) -> &ObjectRef {
        &self.handle
    }

    pub fn actions(&self) -> Result<ActionCollection, TaskError> {
        Ok(ActionCollection::new(
            self.handle.get_object(Property::Actions)?,
        ))
    }

    pub fn triggers(&self) -> Result<TriggerCollection, TaskError> {
        Ok(TriggerCollection::new(
            self.handle.get_object(Property::Triggers)?,
        ))
    }

    pub fn settings(&self) -> Result<TaskSettings, TaskError> {
        Ok(TaskSettings::new(
            self.handle.get_object(Property::Settings)?,
        ))
    }

    pub fn principal(&self) -> Result<Principal, TaskError> {
        Ok(Principal::new(self.handle.get_object(Property::Principal)?))
    }

    pub fn registration_info(&self) -> Result<RegistrationInfo, TaskError> {
        Ok(RegistrationInfo::new(
            self.handle.get_object(Property::RegistrationInfo)?,
        ))
    }

    /// Free form text stored with the task. The service never interprets it
    pub fn data(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Data)
    }

    pub fn set_data(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Data, value)?)
    }

    /// Task XML as the service renders it
    pub fn xml_text(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::XmlText)
    }

    pub fn set_xml_text(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::XmlText, value)?)
    }

    /// Read the whole definition into a serializable record
    pub fn snapshot(&self) -> Result<TaskSnapshot, TaskError> {
        snapshot_definition(self)
    }

    /// Read the whole definition and serialize it as JSON
    pub fn snapshot_json(&self) -> Result<String, TaskError> {
        let snapshot = self.snapshot()?;
        match serde_json::to_string(&snapshot) {
            Ok(result) => Ok(result),
            Err(err) => {
                error!("[tasks] Could not serialize task definition: {err:?}");
                Err(TaskError::Serialize)
            }
        }
    }
}
