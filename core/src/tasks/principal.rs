use super::{
    error::TaskError,
    fields::{read_enum, read_text},
};
use crate::service::object::{ObjectRef, Property};
use common::windows::{LogonType, RunLevel};

/// Security context the task runs under
#[derive(Debug, Clone)]
pub struct Principal {
    handle: ObjectRef,
}

impl Principal {
    pub(crate) fn new(handle: ObjectRef) -> Principal {
        Principal { handle }
    }

    pub fn display_name(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::DisplayName)
    }

    pub fn set_display_name(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::DisplayName, value)?)
    }

    /// Group whose members may run the task
    pub fn group_id(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::GroupId)
    }

    pub fn set_group_id(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::GroupId, value)?)
    }

    pub fn id(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Id)
    }

    pub fn set_id(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Id, value)?)
    }

    pub fn logon_type(&self) -> Result<LogonType, TaskError> {
        read_enum(&self.handle, Property::LogonType)
    }

    pub fn set_logon_type(&self, value: LogonType) -> Result<(), TaskError> {
        Ok(self
            .handle
            .put_int(Property::LogonType, i64::from(value.as_raw()))?)
    }

    pub fn run_level(&self) -> Result<RunLevel, TaskError> {
        read_enum(&self.handle, Property::RunLevel)
    }

    pub fn set_run_level(&self, value: RunLevel) -> Result<(), TaskError> {
        Ok(self
            .handle
            .put_int(Property::RunLevel, i64::from(value.as_raw()))?)
    }

    pub fn user_id(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::UserId)
    }

    pub fn set_user_id(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::UserId, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::Principal;
    use crate::{
        service::{
            memory::memory_service,
            object::{Method, Property, ServiceObject},
        },
        tasks::error::TaskError,
    };
    use common::windows::{LogonType, RunLevel};

    fn principal() -> Principal {
        let service = memory_service();
        service
            .call(Method::Connect {
                server: None,
                user: None,
                domain: None,
                password: None,
            })
            .unwrap();
        let definition = service.call(Method::NewTask(0)).unwrap().into_object().unwrap();
        Principal::new(definition.get_object(Property::Principal).unwrap())
    }

    #[test]
    fn test_logon_type() {
        let principal = principal();
        assert_eq!(
            principal.logon_type().unwrap(),
            LogonType::InteractiveToken
        );
        principal.set_logon_type(LogonType::ServiceAccount).unwrap();
        principal.set_user_id("NT AUTHORITY\\SYSTEM").unwrap();
        assert_eq!(principal.logon_type().unwrap(), LogonType::ServiceAccount);
        assert_eq!(principal.user_id().unwrap().unwrap(), "NT AUTHORITY\\SYSTEM");
    }

    #[test]
    fn test_run_level() {
        let principal = principal();
        assert_eq!(principal.run_level().unwrap(), RunLevel::Lua);
        principal.set_run_level(RunLevel::Highest).unwrap();
        assert_eq!(principal.run_level().unwrap(), RunLevel::Highest);

        principal.handle.put_int(Property::RunLevel, 4).unwrap();
        assert_eq!(
            principal.run_level().unwrap_err(),
            TaskError::UnexpectedValue
        );
    }

    #[test]
    fn test_names() {
        let principal = principal();
        assert_eq!(principal.display_name().unwrap(), None);
        principal.set_display_name("Backup operator").unwrap();
        principal.set_group_id("BUILTIN\\Backup Operators").unwrap();
        principal.set_id("Author").unwrap();
        assert_eq!(
            principal.group_id().unwrap().unwrap(),
            "BUILTIN\\Backup Operators"
        );
        assert_eq!(principal.id().unwrap().unwrap(), "Author");
    }
}
