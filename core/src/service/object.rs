use super::error::{ServiceError, DISP_E_TYPEMISMATCH};
use std::{fmt::Debug, rc::Rc};

/// Shared handle to an object owned by the service
pub type ObjectRef = Rc<dyn ServiceObject>;

/// Property names understood by the service objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    Actions,
    AllowDemandStart,
    AllowHardTerminate,
    Arguments,
    Attachments,
    Author,
    Bcc,
    Body,
    Cc,
    ClassId,
    Compatibility,
    Connected,
    ConnectedDomain,
    ConnectedUser,
    Context,
    Count,
    CurrentAction,
    Data,
    Date,
    DaysInterval,
    DaysOfMonth,
    DaysOfWeek,
    Definition,
    Delay,
    DeleteExpiredTaskAfter,
    Description,
    DisallowStartIfOnBatteries,
    DisplayName,
    Documentation,
    Duration,
    Enabled,
    EndBoundary,
    EnginePid,
    ExecutionTimeLimit,
    From,
    GroupId,
    HeaderFields,
    Hidden,
    HighestVersion,
    Id,
    IdleDuration,
    IdleSettings,
    InstanceGuid,
    Interval,
    LastRunTime,
    LastTaskResult,
    LogonType,
    MessageBody,
    MonthsOfYear,
    MultipleInstances,
    Name,
    NetworkSettings,
    NextRunTime,
    NumberOfMissedRuns,
    Path,
    Principal,
    Priority,
    RandomDelay,
    RegistrationInfo,
    Repetition,
    ReplyTo,
    RestartCount,
    RestartInterval,
    RestartOnIdle,
    RunLevel,
    RunOnLastDayOfMonth,
    RunOnLastWeekOfMonth,
    RunOnlyIfIdle,
    RunOnlyIfNetworkAvailable,
    SecurityDescriptor,
    Server,
    Settings,
    Source,
    StartBoundary,
    StartWhenAvailable,
    State,
    StateChange,
    StopAtDurationEnd,
    StopIfGoingOnBatteries,
    StopOnIdleEnd,
    Subject,
    Subscription,
    TargetServer,
    Title,
    To,
    Triggers,
    /// Discriminator of actions and triggers. Read only
    Type,
    Uri,
    UserId,
    Value,
    ValueQueries,
    Version,
    WaitTimeout,
    WakeToRun,
    WeeksInterval,
    WeeksOfMonth,
    WorkingDirectory,
    Xml,
    XmlText,
}

/// Service methods and their arguments. Collection indexes are 1-based
#[derive(Debug, Clone)]
pub enum Method {
    Connect {
        server: Option<String>,
        user: Option<String>,
        domain: Option<String>,
        password: Option<String>,
    },
    GetFolder(String),
    GetRunningTasks(i32),
    NewTask(u32),
    CreateFolder {
        name: String,
        sddl: Option<String>,
    },
    DeleteFolder {
        name: String,
        flags: i32,
    },
    DeleteTask {
        name: String,
        flags: i32,
    },
    GetFolders(i32),
    GetTask(String),
    GetTasks(i32),
    RegisterTask {
        path: Option<String>,
        xml: String,
        flags: u32,
        user: Option<String>,
        password: Option<String>,
        logon_type: i32,
        sddl: Option<String>,
    },
    RegisterTaskDefinition {
        path: Option<String>,
        definition: ObjectRef,
        flags: u32,
        user: Option<String>,
        password: Option<String>,
        logon_type: i32,
        sddl: Option<String>,
    },
    GetSecurityDescriptor(u32),
    SetSecurityDescriptor {
        sddl: String,
        flags: u32,
    },
    Item(i32),
    /// Enumerate every member of a collection
    Items,
    Create(i32),
    CreatePair {
        name: String,
        value: String,
    },
    Remove(i32),
    Clear,
    Run(Option<String>),
    RunEx {
        params: Option<String>,
        flags: u32,
        session_id: i32,
        user: Option<String>,
    },
    Stop(i32),
    Refresh,
    GetInstances(i32),
    GetRunTimes {
        start: String,
        end: String,
        count: u32,
    },
}

/// Property value. `Empty` is what the service returns for unset values
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Variant {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Text(String),
    Texts(Vec<String>),
}

/// Result of a method call
#[derive(Debug, Clone)]
pub enum Reply {
    Unit,
    Value(Variant),
    Object(ObjectRef),
    Objects(Vec<ObjectRef>),
    Values(Vec<Variant>),
}

impl Reply {
    pub fn into_object(self) -> Result<ObjectRef, ServiceError> {
        match self {
            Reply::Object(object) => Ok(object),
            _ => Err(ServiceError::new(DISP_E_TYPEMISMATCH, "Expected an object")),
        }
    }

    pub fn into_objects(self) -> Result<Vec<ObjectRef>, ServiceError> {
        match self {
            Reply::Objects(objects) => Ok(objects),
            _ => Err(ServiceError::new(DISP_E_TYPEMISMATCH, "Expected a list of objects")),
        }
    }

    pub fn into_value(self) -> Result<Variant, ServiceError> {
        match self {
            Reply::Value(value) => Ok(value),
            Reply::Unit => Ok(Variant::Empty),
            _ => Err(ServiceError::new(DISP_E_TYPEMISMATCH, "Expected a value")),
        }
    }

    pub fn into_values(self) -> Result<Vec<Variant>, ServiceError> {
        match self {
            Reply::Values(values) => Ok(values),
            _ => Err(ServiceError::new(DISP_E_TYPEMISMATCH, "Expected a list of values")),
        }
    }
}

/**
 * An object living inside the task scheduling service.
 *
 * Objects are shared handles, so every operation takes `&self` and the implementation is responsible for its own
 * interior mutability. Nothing here is thread safe
 */
pub trait ServiceObject: Debug {
    fn get(&self, property: Property) -> Result<Variant, ServiceError>;
    fn put(&self, property: Property, value: Variant) -> Result<(), ServiceError>;
    fn get_object(&self, property: Property) -> Result<ObjectRef, ServiceError>;
    fn put_object(&self, property: Property, value: ObjectRef) -> Result<(), ServiceError>;
    fn call(&self, method: Method) -> Result<Reply, ServiceError>;

    /// Read a text property. Unset is an empty string
    fn text(&self, property: Property) -> Result<String, ServiceError> {
        match self.get(property)? {
            Variant::Text(value) => Ok(value),
            Variant::Empty => Ok(String::new()),
            other => Err(mismatch(property, &other)),
        }
    }

    /// Read a list of text values. Unset is an empty list
    fn texts(&self, property: Property) -> Result<Vec<String>, ServiceError> {
        match self.get(property)? {
            Variant::Texts(values) => Ok(values),
            Variant::Text(value) => Ok(vec![value]),
            Variant::Empty => Ok(Vec::new()),
            other => Err(mismatch(property, &other)),
        }
    }

    fn boolean(&self, property: Property) -> Result<bool, ServiceError> {
        match self.get(property)? {
            Variant::Bool(value) => Ok(value),
            Variant::Empty => Ok(false),
            other => Err(mismatch(property, &other)),
        }
    }

    fn integer(&self, property: Property) -> Result<i64, ServiceError> {
        match self.get(property)? {
            Variant::Int(value) => Ok(value),
            Variant::Empty => Ok(0),
            other => Err(mismatch(property, &other)),
        }
    }

    fn put_text(&self, property: Property, value: &str) -> Result<(), ServiceError> {
        self.put(property, Variant::Text(value.to_string()))
    }

    fn put_texts(&self, property: Property, values: &[String]) -> Result<(), ServiceError> {
        self.put(property, Variant::Texts(values.to_vec()))
    }

    fn put_bool(&self, property: Property, value: bool) -> Result<(), ServiceError> {
        self.put(property, Variant::Bool(value))
    }

    fn put_int(&self, property: Property, value: i64) -> Result<(), ServiceError> {
        self.put(property, Variant::Int(value))
    }
}

fn mismatch(property: Property, value: &Variant) -> ServiceError {
    ServiceError::new(
        DISP_E_TYPEMISMATCH,
        &format!("Property {property:?} holds {value:?}"),
    )
}
