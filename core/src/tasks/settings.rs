use super::{
    error::TaskError,
    fields::{read_enum, read_i32, read_offset, read_text, write_offset},
};
use crate::{
    service::object::{ObjectRef, Property},
    utils::time::{Offset, DEFAULT_DURATION},
};
use common::windows::{Compatibility, InstancesPolicy};
use log::error;
use std::cell::OnceCell;

/// Highest priority the service accepts. 0 is realtime, 10 is idle
const LOWEST_PRIORITY: i32 = 10;

/// How the service runs a task
#[derive(Debug, Clone)]
pub struct TaskSettings {
    handle: ObjectRef,
    idle_settings: OnceCell<IdleSettings>,
    network_settings: OnceCell<NetworkSettings>,
}

/// Generate a getter and setter pair for a boolean setting
macro_rules! bool_setting {
    ($($(#[$meta:meta])* $getter:ident, $setter:ident, $property:expr;)+) => {
        $(
            $(#[$meta])*
            pub fn $getter(&self) -> Result<bool, TaskError> {
                Ok(self.handle.boolean($property)?)
            }

            pub fn $setter(&self, value: bool) -> Result<(), TaskError> {
                Ok(self.handle.put_bool($property, value)?)
            }
        )+
    };
}

impl TaskSettings {
    pub(crate) fn new(handle: ObjectRef) -> TaskSettings {
        TaskSettings {
            handle,
            idle_settings: OnceCell::new(),
            network_settings: OnceCell::new(),
        }
    }

    bool_setting! {
        /// Task can be started by `run` or on demand
        allow_demand_start, set_allow_demand_start, Property::AllowDemandStart;
        allow_hard_terminate, set_allow_hard_terminate, Property::AllowHardTerminate;
        disallow_start_if_on_batteries, set_disallow_start_if_on_batteries, Property::DisallowStartIfOnBatteries;
        enabled, set_enabled, Property::Enabled;
        /// Hidden tasks are left out of listings unless asked for
        hidden, set_hidden, Property::Hidden;
        run_only_if_idle, set_run_only_if_idle, Property::RunOnlyIfIdle;
        run_only_if_network_available, set_run_only_if_network_available, Property::RunOnlyIfNetworkAvailable;
        /// Start as soon as possible after a missed scheduled start
        start_when_available, set_start_when_available, Property::StartWhenAvailable;
        stop_if_going_on_batteries, set_stop_if_going_on_batteries, Property::StopIfGoingOnBatteries;
        wake_to_run, set_wake_to_run, Property::WakeToRun;
    }

    pub fn compatibility(&self) -> Result<Compatibility, TaskError> {
        read_enum(&self.handle, Property::Compatibility)
    }

    pub fn set_compatibility(&self, value: Compatibility) -> Result<(), TaskError> {
        Ok(self
            .handle
            .put_int(Property::Compatibility, i64::from(value.as_raw()))?)
    }

    /// Delay before an expired task is deleted. Not set means never delete
    pub fn delete_expired_task_after(&self) -> Result<Option<Offset>, TaskError> {
        read_offset(&self.handle, Property::DeleteExpiredTaskAfter)
    }

    pub fn set_delete_expired_task_after(&self, value: Option<Offset>) -> Result<(), TaskError> {
        write_offset(&self.handle, Property::DeleteExpiredTaskAfter, value, "")
    }

    pub fn execution_time_limit(&self) -> Result<Option<Offset>, TaskError> {
        read_offset(&self.handle, Property::ExecutionTimeLimit)
    }

    pub fn set_execution_time_limit(&self, value: Option<Offset>) -> Result<(), TaskError> {
        write_offset(
            &self.handle,
            Property::ExecutionTimeLimit,
            value,
            DEFAULT_DURATION,
        )
    }

    pub fn multiple_instances(&self) -> Result<InstancesPolicy, TaskError> {
        read_enum(&self.handle, Property::MultipleInstances)
    }

    pub fn set_multiple_instances(&self, value: InstancesPolicy) -> Result<(), TaskError> {
        Ok(self
            .handle
            .put_int(Property::MultipleInstances, i64::from(value.as_raw()))?)
    }

    pub fn priority(&self) -> Result<i32, TaskError> {
        read_i32(&self.handle, Property::Priority)
    }

    /// Set the priority. Values outside 0 to 10 are refused before reaching the service
    pub fn set_priority(&self, value: i32) -> Result<(), TaskError> {
        if !(0..=LOWEST_PRIORITY).contains(&value) {
            error!("[settings] Priority {value} is outside 0 to {LOWEST_PRIORITY}");
            return Err(TaskError::Priority);
        }
        Ok(self.handle.put_int(Property::Priority, i64::from(value))?)
    }

    /// Restart attempts after a failure
    pub fn restart_count(&self) -> Result<i32, TaskError> {
        read_i32(&self.handle, Property::RestartCount)
    }

    pub fn set_restart_count(&self, value: i32) -> Result<(), TaskError> {
        Ok(self.handle.put_int(Property::RestartCount, i64::from(value))?)
    }

    pub fn restart_interval(&self) -> Result<Option<Offset>, TaskError> {
        read_offset(&self.handle, Property::RestartInterval)
    }

    pub fn set_restart_interval(&self, value: Option<Offset>) -> Result<(), TaskError> {
        write_offset(&self.handle, Property::RestartInterval, value, "")
    }

    pub fn xml_text(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::XmlText)
    }

    pub fn set_xml_text(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::XmlText, value)?)
    }

    pub fn idle_settings(&self) -> Result<&IdleSettings, TaskError> {
        if let Some(settings) = self.idle_settings.get() {
            return Ok(settings);
        }
        let handle = self.handle.get_object(Property::IdleSettings)?;
        Ok(self
            .idle_settings
            .get_or_init(|| IdleSettings { handle }))
    }

    pub fn network_settings(&self) -> Result<&NetworkSettings, TaskError> {
        if let Some(settings) = self.network_settings.get() {
            return Ok(settings);
        }
        let handle = self.handle.get_object(Property::NetworkSettings)?;
        Ok(self
            .network_settings
            .get_or_init(|| NetworkSettings { handle }))
    }
}

/// What the service does when the computer is idle
#[derive(Debug, Clone)]
pub struct IdleSettings {
    handle: ObjectRef,
}

impl IdleSettings {
    /// How long the computer must be idle before the task starts
    pub fn idle_duration(&self) -> Result<Option<Offset>, TaskError> {
        read_offset(&self.handle, Property::IdleDuration)
    }

    pub fn set_idle_duration(&self, value: Option<Offset>) -> Result<(), TaskError> {
        write_offset(&self.handle, Property::IdleDuration, value, DEFAULT_DURATION)
    }

    /// How long to wait for the computer to go idle
    pub fn wait_timeout(&self) -> Result<Option<Offset>, TaskError> {
        read_offset(&self.handle, Property::WaitTimeout)
    }

    pub fn set_wait_timeout(&self, value: Option<Offset>) -> Result<(), TaskError> {
        write_offset(&self.handle, Property::WaitTimeout, value, DEFAULT_DURATION)
    }

    pub fn restart_on_idle(&self) -> Result<bool, TaskError> {
        Ok(self.handle.boolean(Property::RestartOnIdle)?)
    }

    pub fn set_restart_on_idle(&self, value: bool) -> Result<(), TaskError> {
        Ok(self.handle.put_bool(Property::RestartOnIdle, value)?)
    }

    pub fn stop_on_idle_end(&self) -> Result<bool, TaskError> {
        Ok(self.handle.boolean(Property::StopOnIdleEnd)?)
    }

    pub fn set_stop_on_idle_end(&self, value: bool) -> Result<(), TaskError> {
        Ok(self.handle.put_bool(Property::StopOnIdleEnd, value)?)
    }
}

/// Network profile that must be available when the task only runs with a network
#[derive(Debug, Clone)]
pub struct NetworkSettings {
    handle: ObjectRef,
}

impl NetworkSettings {
    pub fn id(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Id)
    }

    pub fn set_id(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Id, value)?)
    }

    pub fn name(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Name)
    }

    pub fn set_name(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Name, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::TaskSettings;
    use crate::{
        service::{
            memory::memory_service,
            object::{Method, Property, ServiceObject},
        },
        tasks::error::TaskError,
        utils::time::Offset,
    };
    use common::windows::{Compatibility, InstancesPolicy};

    fn settings() -> TaskSettings {
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
        TaskSettings::new(definition.get_object(Property::Settings).unwrap())
    }

    #[test]
    fn test_defaults() {
        let settings = settings();
        assert_eq!(settings.priority().unwrap(), 7);
        assert_eq!(settings.compatibility().unwrap(), Compatibility::V2);
        assert_eq!(
            settings.multiple_instances().unwrap(),
            InstancesPolicy::IgnoreNew
        );
        assert_eq!(
            settings.execution_time_limit().unwrap(),
            Some(Offset::from_hours(72))
        );
        assert!(settings.enabled().unwrap());
        assert!(!settings.hidden().unwrap());
        assert_eq!(settings.restart_interval().unwrap(), None);
    }

    #[test]
    fn test_set_priority() {
        let settings = settings();
        settings.set_priority(0).unwrap();
        settings.set_priority(10).unwrap();
        assert_eq!(settings.priority().unwrap(), 10);
    }

    #[test]
    #[should_panic(expected = "Priority")]
    fn test_set_priority_out_of_range() {
        settings().set_priority(11).unwrap();
    }

    #[test]
    fn test_priority_checked_before_forwarding() {
        let settings = settings();
        assert_eq!(settings.set_priority(-1).unwrap_err(), TaskError::Priority);
        assert_eq!(settings.priority().unwrap(), 7);
    }

    #[test]
    fn test_optional_durations() {
        let settings = settings();
        settings.set_restart_interval(None).unwrap();
        settings.set_delete_expired_task_after(None).unwrap();
        assert_eq!(settings.handle.text(Property::RestartInterval).unwrap(), "");

        settings
            .set_delete_expired_task_after(Some(Offset::from_days(30)))
            .unwrap();
        assert_eq!(
            settings.handle.text(Property::DeleteExpiredTaskAfter).unwrap(),
            "P30DT"
        );
        settings.set_execution_time_limit(None).unwrap();
        assert_eq!(
            settings.handle.text(Property::ExecutionTimeLimit).unwrap(),
            "PT0S"
        );
    }

    #[test]
    fn test_idle_settings() {
        let settings = settings();
        let idle = settings.idle_settings().unwrap();
        assert_eq!(idle.idle_duration().unwrap(), Some(Offset::from_minutes(10)));
        assert_eq!(idle.wait_timeout().unwrap(), Some(Offset::from_hours(1)));
        assert!(idle.stop_on_idle_end().unwrap());

        idle.set_restart_on_idle(true).unwrap();
        assert!(settings.idle_settings().unwrap().restart_on_idle().unwrap());
    }

    #[test]
    fn test_network_settings() {
        let settings = settings();
        let network = settings.network_settings().unwrap();
        assert_eq!(network.name().unwrap(), None);
        network.set_name("Office").unwrap();
        network
            .set_id("{2b3c9f1e-0d55-4c0b-9a7c-0a1d7e9b2f10}")
            .unwrap();
        assert_eq!(network.name().unwrap().unwrap(), "Office");
    }
}
