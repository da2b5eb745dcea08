use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declare an enum that travels over the service interface as a plain integer.
/// Conversion from the raw value fails with the raw value when it is not a known variant
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $name {
            pub const fn as_raw(&self) -> i32 {
                *self as i32
            }
        }

        impl TryFrom<i32> for $name {
            type Error = i32;

            fn try_from(raw: i32) -> Result<$name, i32> {
                match raw {
                    $( $value => Ok($name::$variant), )+
                    _ => Err(raw),
                }
            }
        }
    };
}

wire_enum! {
    /// Discriminator of an action. Fixed when the action is created
    ActionKind {
        Exec = 0,
        ComHandler = 5,
        /// Deprecated by the service, still readable from older tasks
        SendEmail = 6,
        /// Deprecated by the service, still readable from older tasks
        ShowMessage = 7,
    }
}

wire_enum! {
    /// Discriminator of a trigger. Fixed when the trigger is created
    TriggerKind {
        Event = 0,
        Time = 1,
        Daily = 2,
        Weekly = 3,
        Monthly = 4,
        MonthlyDow = 5,
        Idle = 6,
        Registration = 7,
        Boot = 8,
        Logon = 9,
        SessionStateChange = 11,
        /// Known to the service but has no typed wrapper
        Custom = 12,
    }
}

wire_enum! {
    Compatibility {
        At = 0,
        V1 = 1,
        V2 = 2,
        V2_1 = 3,
        V2_2 = 4,
        V2_3 = 5,
        V2_4 = 6,
    }
}

wire_enum! {
    /// What happens when a task is started while an instance is already running
    InstancesPolicy {
        Parallel = 0,
        Queue = 1,
        IgnoreNew = 2,
        StopExisting = 3,
    }
}

wire_enum! {
    LogonType {
        None = 0,
        Password = 1,
        S4u = 2,
        InteractiveToken = 3,
        Group = 4,
        ServiceAccount = 5,
        InteractiveTokenOrPassword = 6,
    }
}

wire_enum! {
    RunLevel {
        /// Least privileges
        Lua = 0,
        Highest = 1,
    }
}

wire_enum! {
    SessionStateChangeType {
        ConsoleConnect = 1,
        ConsoleDisconnect = 2,
        RemoteConnect = 3,
        RemoteDisconnect = 4,
        SessionLock = 7,
        SessionUnlock = 8,
    }
}

wire_enum! {
    /// Operational state of a registered or running task
    TaskState {
        Unknown = 0,
        Disabled = 1,
        Queued = 2,
        Ready = 3,
        Running = 4,
    }
}

/**
 * Serializable view of a task definition.
 * Instants and durations keep the service wire format. `data` is arbitrary, we base64 encode it
 */
#[derive(Debug, Serialize)]
pub struct TaskSnapshot {
    pub registration_info: RegistrationSnapshot,
    pub principal: PrincipalSnapshot,
    pub settings: SettingsSnapshot,
    pub triggers: Vec<TriggerSnapshot>,
    pub actions: Vec<ActionSnapshot>,
    pub data: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegistrationSnapshot {
    pub uri: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub documentation: Option<String>,
    pub source: Option<String>,
    pub version: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PrincipalSnapshot {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
    pub display_name: Option<String>,
    pub logon_type: LogonType,
    pub run_level: RunLevel,
}

#[derive(Debug, Serialize)]
pub struct SettingsSnapshot {
    pub enabled: bool,
    pub hidden: bool,
    pub allow_demand_start: bool,
    pub allow_hard_terminate: bool,
    pub compatibility: Compatibility,
    pub multiple_instances: InstancesPolicy,
    pub priority: i32,
    pub execution_time_limit: Option<String>,
    pub delete_expired_task_after: Option<String>,
    pub restart_count: i32,
    pub restart_interval: Option<String>,
    pub start_when_available: bool,
    pub run_only_if_idle: bool,
    pub run_only_if_network_available: bool,
    pub disallow_start_if_on_batteries: bool,
    pub stop_if_going_on_batteries: bool,
    pub wake_to_run: bool,
}

#[derive(Debug, Serialize)]
pub struct TriggerSnapshot {
    pub id: Option<String>,
    pub enabled: bool,
    pub start_boundary: Option<String>,
    pub end_boundary: Option<String>,
    pub execution_time_limit: Option<String>,
    pub repetition: Option<RepetitionSnapshot>,
    #[serde(flatten)]
    pub details: TriggerDetails,
}

#[derive(Debug, Serialize)]
pub struct RepetitionSnapshot {
    pub interval: Option<String>,
    pub duration: Option<String>,
    pub stop_at_duration_end: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind")]
pub enum TriggerDetails {
    Event {
        subscription: Option<String>,
        delay: Option<String>,
        value_queries: BTreeMap<String, String>,
    },
    Time {
        random_delay: Option<String>,
    },
    Daily {
        days_interval: i32,
        random_delay: Option<String>,
    },
    Weekly {
        weeks_interval: i32,
        days_of_week: Vec<String>,
        random_delay: Option<String>,
    },
    Monthly {
        days_of_month: Vec<String>,
        months_of_year: Vec<String>,
        run_on_last_day_of_month: bool,
        random_delay: Option<String>,
    },
    MonthlyDow {
        days_of_week: Vec<String>,
        weeks_of_month: Vec<String>,
        months_of_year: Vec<String>,
        run_on_last_week_of_month: bool,
        random_delay: Option<String>,
    },
    Idle,
    Registration {
        delay: Option<String>,
    },
    Boot {
        delay: Option<String>,
    },
    Logon {
        delay: Option<String>,
        user_id: Option<String>,
    },
    SessionStateChange {
        delay: Option<String>,
        user_id: Option<String>,
        state_change: SessionStateChangeType,
    },
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum ActionSnapshot {
    Exec {
        id: Option<String>,
        path: String,
        arguments: Option<String>,
        working_directory: Option<String>,
    },
    ComHandler {
        id: Option<String>,
        class_id: String,
        data: Option<String>,
    },
    SendEmail {
        id: Option<String>,
        server: Option<String>,
        from: Option<String>,
        to: Option<String>,
        cc: Option<String>,
        bcc: Option<String>,
        reply_to: Option<String>,
        subject: Option<String>,
        body: Option<String>,
        attachments: Vec<String>,
        header_fields: BTreeMap<String, String>,
    },
    ShowMessage {
        id: Option<String>,
        title: Option<String>,
        body: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::{ActionKind, ActionSnapshot, SessionStateChangeType, TaskState, TriggerKind};

    #[test]
    fn test_action_kind_try_from() {
        assert_eq!(ActionKind::try_from(0), Ok(ActionKind::Exec));
        assert_eq!(ActionKind::try_from(7), Ok(ActionKind::ShowMessage));
        assert_eq!(ActionKind::try_from(1), Err(1));
        assert_eq!(ActionKind::SendEmail.as_raw(), 6);
    }

    #[test]
    fn test_trigger_kind_gap() {
        assert_eq!(TriggerKind::try_from(11), Ok(TriggerKind::SessionStateChange));
        assert_eq!(TriggerKind::try_from(10), Err(10));
        assert_eq!(TriggerKind::Custom.as_raw(), 12);
    }

    #[test]
    fn test_other_wire_enums() {
        assert_eq!(TaskState::try_from(4), Ok(TaskState::Running));
        assert_eq!(
            SessionStateChangeType::try_from(8),
            Ok(SessionStateChangeType::SessionUnlock)
        );
        assert_eq!(SessionStateChangeType::try_from(5), Err(5));
    }

    #[test]
    fn test_action_snapshot_tagged() {
        let action = ActionSnapshot::Exec {
            id: None,
            path: String::from("cmd.exe"),
            arguments: Some(String::from("/c echo")),
            working_directory: None,
        };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["kind"], "Exec");
        assert_eq!(value["path"], "cmd.exe");
        assert_eq!(value["arguments"], "/c echo");
    }
}
