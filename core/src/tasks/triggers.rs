/**
 * Triggers decide when a task starts.
 *
 * Like actions, trigger handles from the service are untyped. `wrap_trigger` reads the `Type` property and picks the
 * wrapper from a fixed table. Custom triggers are reported by the service but have no wrapper and are refused.
 *
 * References:
 * `https://learn.microsoft.com/en-us/windows/win32/taskschd/triggercollection`
 * `https://learn.microsoft.com/en-us/windows/win32/taskschd/trigger`
 */
use super::{
    collection,
    error::TaskError,
    fields::{
        read_enum, read_i32, read_instant, read_mask, read_offset, read_short_mask, read_text,
        write_instant, write_offset,
    },
    repetition::RepetitionPattern,
    values::TaskNamedValueCollection,
};
use crate::{
    service::object::{Method, ObjectRef, Property},
    utils::time::{Instant, Offset, DEFAULT_DURATION},
};
use common::{
    flags::{DaysOfMonth, DaysOfWeek, MonthsOfYear, WeeksOfMonth},
    windows::{SessionStateChangeType, TriggerKind},
};
use log::error;
use std::cell::OnceCell;

/// Builds the typed wrapper for one kind of trigger
pub type TriggerConstructor = fn(ObjectRef) -> Trigger;

/// Every trigger kind that has a wrapper
static TRIGGER_VARIANTS: [(TriggerKind, TriggerConstructor); 11] = [
    (TriggerKind::Event, event_variant),
    (TriggerKind::Time, time_variant),
    (TriggerKind::Daily, daily_variant),
    (TriggerKind::Weekly, weekly_variant),
    (TriggerKind::Monthly, monthly_variant),
    (TriggerKind::MonthlyDow, monthly_dow_variant),
    (TriggerKind::Idle, idle_variant),
    (TriggerKind::Registration, registration_variant),
    (TriggerKind::Boot, boot_variant),
    (TriggerKind::Logon, logon_variant),
    (TriggerKind::SessionStateChange, session_state_change_variant),
];

/// Look up the wrapper constructor for a trigger kind
pub fn resolve_trigger_variant(kind: TriggerKind) -> Result<TriggerConstructor, TaskError> {
    for (variant_kind, constructor) in TRIGGER_VARIANTS.iter() {
        if *variant_kind == kind {
            return Ok(*constructor);
        }
    }
    error!("[triggers] No wrapper registered for trigger kind {kind:?}");
    Err(TaskError::UnsupportedKind)
}

/// Wrap a trigger handle in the type matching its `Type` property
pub fn wrap_trigger(handle: ObjectRef) -> Result<Trigger, TaskError> {
    let raw = handle.integer(Property::Type)?;
    let kind = match i32::try_from(raw).map(TriggerKind::try_from) {
        Ok(Ok(result)) => result,
        _ => {
            error!("[triggers] Service returned unknown trigger type {raw}");
            return Err(TaskError::UnsupportedKind);
        }
    };
    let constructor = resolve_trigger_variant(kind)?;
    Ok(constructor(handle))
}

/// Properties every trigger has
#[derive(Debug, Clone)]
pub struct TriggerBase {
    handle: ObjectRef,
    repetition: OnceCell<RepetitionPattern>,
}

impl TriggerBase {
    fn new(handle: ObjectRef) -> TriggerBase {
        TriggerBase {
            handle,
            repetition: OnceCell::new(),
        }
    }

    /// Kind as reported by the service
    pub fn reported_kind(&self) -> Result<TriggerKind, TaskError> {
        read_enum(&self.handle, Property::Type)
    }

    pub fn id(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Id)
    }

    pub fn set_id(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Id, value)?)
    }

    pub fn enabled(&self) -> Result<bool, TaskError> {
        Ok(self.handle.boolean(Property::Enabled)?)
    }

    pub fn set_enabled(&self, value: bool) -> Result<(), TaskError> {
        Ok(self.handle.put_bool(Property::Enabled, value)?)
    }

    /// When the trigger is activated
    pub fn start_boundary(&self) -> Result<Option<Instant>, TaskError> {
        read_instant(&self.handle, Property::StartBoundary)
    }

    pub fn set_start_boundary(&self, value: Option<Instant>) -> Result<(), TaskError> {
        write_instant(&self.handle, Property::StartBoundary, value)
    }

    /// When the trigger is deactivated
    pub fn end_boundary(&self) -> Result<Option<Instant>, TaskError> {
        read_instant(&self.handle, Property::EndBoundary)
    }

    pub fn set_end_boundary(&self, value: Option<Instant>) -> Result<(), TaskError> {
        write_instant(&self.handle, Property::EndBoundary, value)
    }

    /// Longest a task started by this trigger may run
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

    /// Repetition settings. Fetched from the service on first use and then reused
    pub fn repetition(&self) -> Result<&RepetitionPattern, TaskError> {
        if let Some(pattern) = self.repetition.get() {
            return Ok(pattern);
        }
        let handle = self.handle.get_object(Property::Repetition)?;
        Ok(self
            .repetition
            .get_or_init(|| RepetitionPattern::new(handle)))
    }
}

#[derive(Debug, Clone)]
pub enum Trigger {
    Event(EventTrigger),
    Time(TimeTrigger),
    Daily(DailyTrigger),
    Weekly(WeeklyTrigger),
    Monthly(MonthlyTrigger),
    MonthlyDow(MonthlyDowTrigger),
    Idle(IdleTrigger),
    Registration(RegistrationTrigger),
    Boot(BootTrigger),
    Logon(LogonTrigger),
    SessionStateChange(SessionStateChangeTrigger),
}

impl Trigger {
    /// Kind of the trigger. Fixed when the trigger was created
    pub fn kind(&self) -> TriggerKind {
        match self {
            Trigger::Event(_) => TriggerKind::Event,
            Trigger::Time(_) => TriggerKind::Time,
            Trigger::Daily(_) => TriggerKind::Daily,
            Trigger::Weekly(_) => TriggerKind::Weekly,
            Trigger::Monthly(_) => TriggerKind::Monthly,
            Trigger::MonthlyDow(_) => TriggerKind::MonthlyDow,
            Trigger::Idle(_) => TriggerKind::Idle,
            Trigger::Registration(_) => TriggerKind::Registration,
            Trigger::Boot(_) => TriggerKind::Boot,
            Trigger::Logon(_) => TriggerKind::Logon,
            Trigger::SessionStateChange(_) => TriggerKind::SessionStateChange,
        }
    }

    pub fn base(&self) -> &TriggerBase {
        match self {
            Trigger::Event(trigger) => &trigger.base,
            Trigger::Time(trigger) => &trigger.base,
            Trigger::Daily(trigger) => &trigger.base,
            Trigger::Weekly(trigger) => &trigger.base,
            Trigger::Monthly(trigger) => &trigger.base,
            Trigger::MonthlyDow(trigger) => &trigger.base,
            Trigger::Idle(trigger) => &trigger.base,
            Trigger::Registration(trigger) => &trigger.base,
            Trigger::Boot(trigger) => &trigger.base,
            Trigger::Logon(trigger) => &trigger.base,
            Trigger::SessionStateChange(trigger) => &trigger.base,
        }
    }
}

/// Declare a trigger wrapper holding only the shared trigger properties, plus its table constructor
macro_rules! trigger_variant {
    ($(#[$meta:meta])* $name:ident, $variant:ident, $constructor:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            base: TriggerBase,
        }

        impl $name {
            pub fn base(&self) -> &TriggerBase {
                &self.base
            }
        }

        fn $constructor(handle: ObjectRef) -> Trigger {
            Trigger::$variant($name {
                base: TriggerBase::new(handle),
            })
        }
    };
}

/// Duration getter and setter shared by several trigger kinds
macro_rules! offset_property {
    ($getter:ident, $setter:ident, $property:expr, [$($name:ident),+]) => {
        $(
            impl $name {
                pub fn $getter(&self) -> Result<Option<Offset>, TaskError> {
                    read_offset(&self.base.handle, $property)
                }

                pub fn $setter(&self, value: Option<Offset>) -> Result<(), TaskError> {
                    write_offset(&self.base.handle, $property, value, DEFAULT_DURATION)
                }
            }
        )+
    };
}

trigger_variant!(
    /// Fires at a point in time
    TimeTrigger,
    Time,
    time_variant
);
trigger_variant!(
    /// Fires every few days
    DailyTrigger,
    Daily,
    daily_variant
);
trigger_variant!(
    /// Fires on chosen days every few weeks
    WeeklyTrigger,
    Weekly,
    weekly_variant
);
trigger_variant!(
    /// Fires on chosen days of chosen months
    MonthlyTrigger,
    Monthly,
    monthly_variant
);
trigger_variant!(
    /// Fires on chosen weekdays of chosen weeks, for example the first Monday
    MonthlyDowTrigger,
    MonthlyDow,
    monthly_dow_variant
);
trigger_variant!(
    /// Fires when the computer goes idle
    IdleTrigger,
    Idle,
    idle_variant
);
trigger_variant!(
    /// Fires when the task is registered or updated
    RegistrationTrigger,
    Registration,
    registration_variant
);
trigger_variant!(
    /// Fires when the system boots
    BootTrigger,
    Boot,
    boot_variant
);
trigger_variant!(
    /// Fires when a user logs on
    LogonTrigger,
    Logon,
    logon_variant
);
trigger_variant!(
    /// Fires on session connect, disconnect, lock or unlock
    SessionStateChangeTrigger,
    SessionStateChange,
    session_state_change_variant
);

offset_property!(
    random_delay,
    set_random_delay,
    Property::RandomDelay,
    [
        TimeTrigger,
        DailyTrigger,
        WeeklyTrigger,
        MonthlyTrigger,
        MonthlyDowTrigger
    ]
);
offset_property!(
    delay,
    set_delay,
    Property::Delay,
    [
        EventTrigger,
        RegistrationTrigger,
        BootTrigger,
        LogonTrigger,
        SessionStateChangeTrigger
    ]
);

/// Fires when a matching event is logged
#[derive(Debug, Clone)]
pub struct EventTrigger {
    base: TriggerBase,
    value_queries: OnceCell<TaskNamedValueCollection>,
}

fn event_variant(handle: ObjectRef) -> Trigger {
    Trigger::Event(EventTrigger {
        base: TriggerBase::new(handle),
        value_queries: OnceCell::new(),
    })
}

impl EventTrigger {
    pub fn base(&self) -> &TriggerBase {
        &self.base
    }

    /// Event query selecting the events that fire the trigger
    pub fn subscription(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.base.handle, Property::Subscription)
    }

    pub fn set_subscription(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.base.handle.put_text(Property::Subscription, value)?)
    }

    /// Named XPath queries run against the matching event. Fetched once and reused
    pub fn value_queries(&self) -> Result<&TaskNamedValueCollection, TaskError> {
        if let Some(queries) = self.value_queries.get() {
            return Ok(queries);
        }
        let handle = self.base.handle.get_object(Property::ValueQueries)?;
        Ok(self
            .value_queries
            .get_or_init(|| TaskNamedValueCollection::new(handle)))
    }

    pub fn set_value_queries(&mut self, value: &TaskNamedValueCollection) -> Result<(), TaskError> {
        self.base
            .handle
            .put_object(Property::ValueQueries, value.handle().clone())?;
        self.value_queries = OnceCell::new();
        Ok(())
    }
}

impl DailyTrigger {
    /// Days between runs
    pub fn days_interval(&self) -> Result<i32, TaskError> {
        read_i32(&self.base.handle, Property::DaysInterval)
    }

    pub fn set_days_interval(&self, value: i32) -> Result<(), TaskError> {
        Ok(self
            .base
            .handle
            .put_int(Property::DaysInterval, i64::from(value))?)
    }
}

impl WeeklyTrigger {
    /// Weeks between runs
    pub fn weeks_interval(&self) -> Result<i32, TaskError> {
        read_i32(&self.base.handle, Property::WeeksInterval)
    }

    pub fn set_weeks_interval(&self, value: i32) -> Result<(), TaskError> {
        Ok(self
            .base
            .handle
            .put_int(Property::WeeksInterval, i64::from(value))?)
    }

    pub fn days_of_week(&self) -> Result<DaysOfWeek, TaskError> {
        let bits = read_short_mask(&self.base.handle, Property::DaysOfWeek)?;
        Ok(DaysOfWeek::from_bits(bits))
    }

    pub fn set_days_of_week(&self, value: DaysOfWeek) -> Result<(), TaskError> {
        Ok(self
            .base
            .handle
            .put_int(Property::DaysOfWeek, i64::from(value.bits()))?)
    }
}

impl MonthlyTrigger {
    pub fn days_of_month(&self) -> Result<DaysOfMonth, TaskError> {
        let bits = read_mask(&self.base.handle, Property::DaysOfMonth)?;
        Ok(DaysOfMonth::from_bits(bits))
    }

    pub fn set_days_of_month(&self, value: DaysOfMonth) -> Result<(), TaskError> {
        Ok(self
            .base
            .handle
            .put_int(Property::DaysOfMonth, i64::from(value.bits()))?)
    }

    pub fn months_of_year(&self) -> Result<MonthsOfYear, TaskError> {
        let bits = read_short_mask(&self.base.handle, Property::MonthsOfYear)?;
        Ok(MonthsOfYear::from_bits(bits))
    }

    pub fn set_months_of_year(&self, value: MonthsOfYear) -> Result<(), TaskError> {
        Ok(self
            .base
            .handle
            .put_int(Property::MonthsOfYear, i64::from(value.bits()))?)
    }

    pub fn run_on_last_day_of_month(&self) -> Result<bool, TaskError> {
        Ok(self.base.handle.boolean(Property::RunOnLastDayOfMonth)?)
    }

    pub fn set_run_on_last_day_of_month(&self, value: bool) -> Result<(), TaskError> {
        Ok(self
            .base
            .handle
            .put_bool(Property::RunOnLastDayOfMonth, value)?)
    }
}

impl MonthlyDowTrigger {
    pub fn days_of_week(&self) -> Result<DaysOfWeek, TaskError> {
        let bits = read_short_mask(&self.base.handle, Property::DaysOfWeek)?;
        Ok(DaysOfWeek::from_bits(bits))
    }

    pub fn set_days_of_week(&self, value: DaysOfWeek) -> Result<(), TaskError> {
        Ok(self
            .base
            .handle
            .put_int(Property::DaysOfWeek, i64::from(value.bits()))?)
    }

    pub fn weeks_of_month(&self) -> Result<WeeksOfMonth, TaskError> {
        let bits = read_short_mask(&self.base.handle, Property::WeeksOfMonth)?;
        Ok(WeeksOfMonth::from_bits(bits))
    }

    pub fn set_weeks_of_month(&self, value: WeeksOfMonth) -> Result<(), TaskError> {
        Ok(self
            .base
            .handle
            .put_int(Property::WeeksOfMonth, i64::from(value.bits()))?)
    }

    pub fn months_of_year(&self) -> Result<MonthsOfYear, TaskError> {
        let bits = read_short_mask(&self.base.handle, Property::MonthsOfYear)?;
        Ok(MonthsOfYear::from_bits(bits))
    }

    pub fn set_months_of_year(&self, value: MonthsOfYear) -> Result<(), TaskError> {
        Ok(self
            .base
            .handle
            .put_int(Property::MonthsOfYear, i64::from(value.bits()))?)
    }

    pub fn run_on_last_week_of_month(&self) -> Result<bool, TaskError> {
        Ok(self.base.handle.boolean(Property::RunOnLastWeekOfMonth)?)
    }

    pub fn set_run_on_last_week_of_month(&self, value: bool) -> Result<(), TaskError> {
        Ok(self
            .base
            .handle
            .put_bool(Property::RunOnLastWeekOfMonth, value)?)
    }
}

impl LogonTrigger {
    /// User whose logon fires the trigger. Not set means any user
    pub fn user_id(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.base.handle, Property::UserId)
    }

    pub fn set_user_id(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.base.handle.put_text(Property::UserId, value)?)
    }
}

impl SessionStateChangeTrigger {
    pub fn user_id(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.base.handle, Property::UserId)
    }

    pub fn set_user_id(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.base.handle.put_text(Property::UserId, value)?)
    }

    pub fn state_change(&self) -> Result<SessionStateChangeType, TaskError> {
        read_enum(&self.base.handle, Property::StateChange)
    }

    pub fn set_state_change(&self, value: SessionStateChangeType) -> Result<(), TaskError> {
        Ok(self
            .base
            .handle
            .put_int(Property::StateChange, i64::from(value.as_raw()))?)
    }
}

/// Triggers of a task definition
#[derive(Debug, Clone)]
pub struct TriggerCollection {
    handle: ObjectRef,
}

impl TriggerCollection {
    pub(crate) fn new(handle: ObjectRef) -> TriggerCollection {
        TriggerCollection { handle }
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

    /// Trigger at a 0-based index
    pub fn item(&self, index: usize) -> Result<Trigger, TaskError> {
        wrap_trigger(collection::item(&self.handle, index)?)
    }

    pub fn to_vec(&self) -> Result<Vec<Trigger>, TaskError> {
        let mut triggers = Vec::new();
        for handle in collection::items(&self.handle)? {
            triggers.push(wrap_trigger(handle)?);
        }
        Ok(triggers)
    }

    pub fn iter(&self) -> Result<std::vec::IntoIter<Trigger>, TaskError> {
        Ok(self.to_vec()?.into_iter())
    }

    /// Add a new trigger of the provided kind
    pub fn create(&self, kind: TriggerKind) -> Result<Trigger, TaskError> {
        let constructor = resolve_trigger_variant(kind)?;
        let handle = self
            .handle
            .call(Method::Create(kind.as_raw()))?
            .into_object()?;
        Ok(constructor(handle))
    }

    pub fn remove(&self, index: usize) -> Result<(), TaskError> {
        collection::remove(&self.handle, index)
    }

    pub fn clear(&self) -> Result<(), TaskError> {
        collection::clear(&self.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        resolve_trigger_variant, wrap_trigger, Trigger, TriggerBase, TriggerCollection,
        TRIGGER_VARIANTS,
    };
    use crate::{
        service::{
            error::ServiceError,
            memory::memory_service,
            object::{Method, ObjectRef, Property, Reply, ServiceObject, Variant},
        },
        tasks::{error::TaskError, values::TaskNamedValueCollection},
        utils::time::{decode_instant, encode_instant, Offset},
    };
    use common::{
        flags::{DaysOfMonth, DaysOfWeek, MonthsOfYear, WeeksOfMonth},
        windows::{SessionStateChangeType, TriggerKind},
    };
    use std::{cell::Cell, rc::Rc};

    fn definition() -> ObjectRef {
        let service = memory_service();
        service
            .call(Method::Connect {
                server: None,
                user: None,
                domain: None,
                password: None,
            })
            .unwrap();
        service.call(Method::NewTask(0)).unwrap().into_object().unwrap()
    }

    fn triggers() -> TriggerCollection {
        TriggerCollection::new(definition().get_object(Property::Triggers).unwrap())
    }

    /// Forwards to another object and counts object fetches
    #[derive(Debug)]
    struct Counting {
        inner: ObjectRef,
        fetches: Cell<usize>,
    }

    impl ServiceObject for Counting {
        fn get(&self, property: Property) -> Result<Variant, ServiceError> {
            self.inner.get(property)
        }

        fn put(&self, property: Property, value: Variant) -> Result<(), ServiceError> {
            self.inner.put(property, value)
        }

        fn get_object(&self, property: Property) -> Result<ObjectRef, ServiceError> {
            self.fetches.set(self.fetches.get() + 1);
            self.inner.get_object(property)
        }

        fn put_object(&self, property: Property, value: ObjectRef) -> Result<(), ServiceError> {
            self.inner.put_object(property, value)
        }

        fn call(&self, method: Method) -> Result<Reply, ServiceError> {
            self.inner.call(method)
        }
    }

    fn counting(kind: TriggerKind) -> Rc<Counting> {
        let inner = definition()
            .get_object(Property::Triggers)
            .unwrap()
            .call(Method::Create(kind.as_raw()))
            .unwrap()
            .into_object()
            .unwrap();
        Rc::new(Counting {
            inner,
            fetches: Cell::new(0),
        })
    }

    #[test]
    fn test_dispatch_consistency() {
        let triggers = triggers();
        for (kind, _) in TRIGGER_VARIANTS.iter() {
            let created = triggers.create(*kind).unwrap();
            let fetched = triggers.item(triggers.count().unwrap() - 1).unwrap();
            assert_eq!(created.kind(), *kind);
            assert_eq!(fetched.kind(), *kind);
            assert_eq!(fetched.base().reported_kind().unwrap(), *kind);
        }

        let iterated: Vec<TriggerKind> = triggers
            .iter()
            .unwrap()
            .map(|trigger| trigger.kind())
            .collect();
        let expected: Vec<TriggerKind> = TRIGGER_VARIANTS.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(iterated, expected);
    }

    #[test]
    fn test_resolve_custom_fails_closed() {
        assert_eq!(
            resolve_trigger_variant(TriggerKind::Custom).unwrap_err(),
            TaskError::UnsupportedKind
        );
        assert_eq!(
            triggers().create(TriggerKind::Custom).unwrap_err(),
            TaskError::UnsupportedKind
        );
    }

    #[test]
    #[should_panic(expected = "UnsupportedKind")]
    fn test_wrap_unknown_trigger() {
        let bogus: ObjectRef = counting(TriggerKind::Boot);
        // No trigger kind uses 10
        let handle = Rc::new(Kind10 { inner: bogus });
        let _ = wrap_trigger(handle).unwrap();
    }

    #[derive(Debug)]
    struct Kind10 {
        inner: ObjectRef,
    }

    impl ServiceObject for Kind10 {
        fn get(&self, property: Property) -> Result<Variant, ServiceError> {
            if property == Property::Type {
                return Ok(Variant::Int(10));
            }
            self.inner.get(property)
        }

        fn put(&self, property: Property, value: Variant) -> Result<(), ServiceError> {
            self.inner.put(property, value)
        }

        fn get_object(&self, property: Property) -> Result<ObjectRef, ServiceError> {
            self.inner.get_object(property)
        }

        fn put_object(&self, property: Property, value: ObjectRef) -> Result<(), ServiceError> {
            self.inner.put_object(property, value)
        }

        fn call(&self, method: Method) -> Result<Reply, ServiceError> {
            self.inner.call(method)
        }
    }

    #[test]
    fn test_repetition_fetched_once() {
        let handle = counting(TriggerKind::Time);
        let base = TriggerBase::new(handle.clone());

        let first = base.repetition().unwrap();
        first.set_interval(Some(Offset::from_minutes(15))).unwrap();
        let second = base.repetition().unwrap();

        assert!(std::ptr::eq(first, second));
        assert_eq!(second.interval().unwrap(), Some(Offset::from_minutes(15)));
        assert_eq!(handle.fetches.get(), 1);
    }

    #[test]
    fn test_common_fields() {
        let trigger = triggers().create(TriggerKind::Time).unwrap();
        let base = trigger.base();
        assert!(base.enabled().unwrap());
        assert_eq!(base.start_boundary().unwrap(), None);

        let start = decode_instant("2024-06-01T09:00:00+02:00").unwrap();
        base.set_start_boundary(start).unwrap();
        base.set_execution_time_limit(Some(Offset::from_hours(1))).unwrap();
        base.set_id("morning").unwrap();

        assert_eq!(base.start_boundary().unwrap(), start);
        assert_eq!(
            encode_instant(base.start_boundary().unwrap()),
            "2024-06-01T09:00:00+02:00"
        );
        assert_eq!(base.execution_time_limit().unwrap(), Some(Offset::from_hours(1)));
        assert_eq!(base.end_boundary().unwrap(), None);
        assert_eq!(base.id().unwrap().unwrap(), "morning");
    }

    #[test]
    fn test_event_value_queries() {
        let triggers = triggers();
        let mut event = match triggers.create(TriggerKind::Event).unwrap() {
            Trigger::Event(event) => event,
            _ => panic!("expected event trigger"),
        };
        event
            .set_subscription("<QueryList><Query Id=\"0\"/></QueryList>")
            .unwrap();
        event.set_delay(Some(Offset::from_seconds(30))).unwrap();
        event.value_queries().unwrap().create("Level", "Event/System/Level").unwrap();
        assert_eq!(event.value_queries().unwrap().count().unwrap(), 1);
        assert_eq!(event.delay().unwrap(), Some(Offset::from_seconds(30)));

        // Borrow the queries of a second event trigger and install them on the first
        let other = match triggers.create(TriggerKind::Event).unwrap() {
            Trigger::Event(other) => other,
            _ => panic!("expected event trigger"),
        };
        let replacement: TaskNamedValueCollection = other.value_queries().unwrap().clone();
        replacement.create("A", "1").unwrap();
        replacement.create("B", "2").unwrap();

        event.set_value_queries(&replacement).unwrap();
        assert_eq!(event.value_queries().unwrap().count().unwrap(), 2);
    }

    #[test]
    fn test_calendar_triggers() {
        let triggers = triggers();
        match triggers.create(TriggerKind::Weekly).unwrap() {
            Trigger::Weekly(weekly) => {
                assert_eq!(weekly.weeks_interval().unwrap(), 1);
                weekly
                    .set_days_of_week(DaysOfWeek::MONDAY | DaysOfWeek::FRIDAY)
                    .unwrap();
                assert!(weekly.days_of_week().unwrap().contains(DaysOfWeek::FRIDAY));
                assert_eq!(weekly.random_delay().unwrap(), None);
            }
            _ => panic!("expected weekly trigger"),
        }

        match triggers.create(TriggerKind::Monthly).unwrap() {
            Trigger::Monthly(monthly) => {
                monthly
                    .set_days_of_month(DaysOfMonth::FIRST | DaysOfMonth::LAST)
                    .unwrap();
                monthly.set_months_of_year(MonthsOfYear::ALL).unwrap();
                monthly.set_run_on_last_day_of_month(true).unwrap();

                assert_eq!(monthly.days_of_month().unwrap().bits(), 0x8000_0001);
                assert_eq!(monthly.months_of_year().unwrap(), MonthsOfYear::ALL);
                assert!(monthly.run_on_last_day_of_month().unwrap());
            }
            _ => panic!("expected monthly trigger"),
        }

        match triggers.create(TriggerKind::MonthlyDow).unwrap() {
            Trigger::MonthlyDow(monthly) => {
                monthly.set_weeks_of_month(WeeksOfMonth::FIRST).unwrap();
                monthly.set_days_of_week(DaysOfWeek::SUNDAY).unwrap();
                assert_eq!(monthly.weeks_of_month().unwrap(), WeeksOfMonth::FIRST);
                assert!(!monthly.run_on_last_week_of_month().unwrap());
            }
            _ => panic!("expected monthly day of week trigger"),
        }

        match triggers.create(TriggerKind::Daily).unwrap() {
            Trigger::Daily(daily) => {
                daily.set_days_interval(3).unwrap();
                assert_eq!(daily.days_interval().unwrap(), 3);
            }
            _ => panic!("expected daily trigger"),
        }
    }

    #[test]
    fn test_session_state_change() {
        match triggers().create(TriggerKind::SessionStateChange).unwrap() {
            Trigger::SessionStateChange(session) => {
                session
                    .set_state_change(SessionStateChangeType::SessionLock)
                    .unwrap();
                session.set_user_id("CORP\\svc_tasks").unwrap();
                assert_eq!(
                    session.state_change().unwrap(),
                    SessionStateChangeType::SessionLock
                );
                assert_eq!(session.user_id().unwrap().unwrap(), "CORP\\svc_tasks");
            }
            _ => panic!("expected session state change trigger"),
        }
    }

    #[test]
    fn test_item_out_of_range() {
        let triggers = triggers();
        assert_eq!(triggers.item(0).unwrap_err(), TaskError::IndexOutOfRange);
        triggers.create(TriggerKind::Boot).unwrap();
        triggers.remove(0).unwrap();
        assert!(triggers.is_empty().unwrap());
    }
}
