use super::bag::{listing, new_running_task};
use crate::{
    service::{
        error::{ServiceError, DISP_E_MEMBERNOTFOUND, E_INVALIDARG, SCHED_E_TASK_DISABLED},
        object::{Method, ObjectRef, Property, Reply, ServiceObject, Variant},
    },
    utils::time::{decode_instant, decode_offset, encode_instant, instant_now, Instant, Offset},
};
use chrono::NaiveDateTime;
use common::windows::{TaskState, TriggerKind};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

/// Result code the service reports for a task that has never run
const TASK_HAS_NOT_RUN: i64 = 0x41303;
/// Result code the service reports while an instance is running
const TASK_RUNNING: i64 = 0x41301;
/// Upper bound on schedule steps walked per trigger when listing run times
const MAX_SCHEDULE_STEPS: usize = 100_000;

/// A task registered in a memory folder. Runs are recorded, nothing is executed
#[derive(Debug)]
pub struct MemoryTask {
    name: String,
    path: String,
    definition: ObjectRef,
    sddl: RefCell<String>,
    instances: RefCell<Vec<ObjectRef>>,
    last_run_time: RefCell<String>,
    last_result: Cell<i64>,
}

impl MemoryTask {
    pub(crate) fn new(name: &str, path: &str, definition: ObjectRef, sddl: &str) -> MemoryTask {
        MemoryTask {
            name: name.to_string(),
            path: path.to_string(),
            definition,
            sddl: RefCell::new(sddl.to_string()),
            instances: RefCell::new(Vec::new()),
            last_run_time: RefCell::new(String::new()),
            last_result: Cell::new(TASK_HAS_NOT_RUN),
        }
    }

    fn settings(&self) -> Result<ObjectRef, ServiceError> {
        self.definition.get_object(Property::Settings)
    }

    pub(crate) fn enabled(&self) -> Result<bool, ServiceError> {
        self.settings()?.boolean(Property::Enabled)
    }

    pub(crate) fn set_enabled(&self, value: bool) -> Result<(), ServiceError> {
        self.settings()?.put_bool(Property::Enabled, value)
    }

    pub(crate) fn hidden(&self) -> Result<bool, ServiceError> {
        self.settings()?.boolean(Property::Hidden)
    }

    /// Instances that have not been stopped
    pub(crate) fn running(&self) -> Result<Vec<ObjectRef>, ServiceError> {
        let mut running = Vec::new();
        for instance in self.instances.borrow().iter() {
            if instance.integer(Property::State)? == TaskState::Running.as_raw() as i64 {
                running.push(instance.clone());
            }
        }
        Ok(running)
    }

    fn state(&self) -> Result<TaskState, ServiceError> {
        if !self.running()?.is_empty() {
            return Ok(TaskState::Running);
        }
        if !self.enabled()? {
            return Ok(TaskState::Disabled);
        }
        Ok(TaskState::Ready)
    }

    fn start(&self) -> Result<Reply, ServiceError> {
        if !self.enabled()? {
            return Err(ServiceError::new(
                SCHED_E_TASK_DISABLED,
                &format!("Task {} is disabled", self.path),
            ));
        }

        let actions = self.definition.get_object(Property::Actions)?;
        let current_action = match actions.call(Method::Items)?.into_objects()?.first() {
            Some(action) => action.text(Property::Id)?,
            None => String::new(),
        };

        let instance: ObjectRef = Rc::new(new_running_task(&self.name, &self.path, &current_action));
        self.instances.borrow_mut().push(instance.clone());
        *self.last_run_time.borrow_mut() = encode_instant(Some(instant_now()));
        self.last_result.set(TASK_RUNNING);
        Ok(Reply::Object(instance))
    }

    fn stop(&self) -> Result<Reply, ServiceError> {
        for instance in self.running()? {
            instance.call(Method::Stop(0))?;
        }
        self.last_result.set(0);
        Ok(Reply::Unit)
    }

    /// Scheduled starts of time and daily triggers between `start` and `end`
    fn run_times(&self, start: &str, end: &str, count: u32) -> Result<Reply, ServiceError> {
        let start = bound(start)?;
        let end = bound(end)?;

        let mut runs: Vec<NaiveDateTime> = Vec::new();
        let triggers = self.definition.get_object(Property::Triggers)?;
        // Disabled triggers still count toward the schedule
        for trigger in triggers.call(Method::Items)?.into_objects()? {
            let step = match TriggerKind::try_from(trigger.integer(Property::Type)? as i32) {
                Ok(TriggerKind::Time) => {
                    let repetition = trigger.get_object(Property::Repetition)?;
                    decode_offset(&repetition.text(Property::Interval)?)
                }
                Ok(TriggerKind::Daily) => {
                    let interval = trigger.integer(Property::DaysInterval)?.max(1);
                    Some(Offset::from_days(u32::try_from(interval).unwrap_or(1)))
                }
                _ => continue,
            };

            let first = match decode_instant(&trigger.text(Property::StartBoundary)?) {
                Ok(Some(result)) => result,
                _ => continue,
            };
            let last = match decode_instant(&trigger.text(Property::EndBoundary)?) {
                Ok(Some(result)) if result.wall_clock() < end => result.wall_clock(),
                _ => end,
            };

            let mut next = Some(first);
            let mut steps = 0;
            while let Some(current) = next {
                let wall_clock = current.wall_clock();
                if wall_clock > last || steps >= MAX_SCHEDULE_STEPS {
                    break;
                }
                if wall_clock >= start {
                    runs.push(wall_clock);
                }
                next = step.and_then(|offset| offset.add_to(&current));
                steps += 1;
            }
        }

        runs.sort();
        runs.dedup();
        runs.truncate(count as usize);
        let values = runs
            .into_iter()
            .map(|run| Variant::Text(encode_instant(Some(Instant::Local(run)))))
            .collect();
        Ok(Reply::Values(values))
    }
}

fn bound(text: &str) -> Result<NaiveDateTime, ServiceError> {
    match decode_instant(text) {
        Ok(Some(result)) => Ok(result.wall_clock()),
        _ => Err(ServiceError::new(
            E_INVALIDARG,
            &format!("Bad run time bound {text:?}"),
        )),
    }
}

fn member_not_found(what: &str) -> ServiceError {
    ServiceError::new(
        DISP_E_MEMBERNOTFOUND,
        &format!("{what} is not supported by a registered task"),
    )
}

impl ServiceObject for MemoryTask {
    fn get(&self, property: Property) -> Result<Variant, ServiceError> {
        let value = match property {
            Property::Name => Variant::Text(self.name.clone()),
            Property::Path => Variant::Text(self.path.clone()),
            Property::Enabled => Variant::Bool(self.enabled()?),
            Property::LastRunTime => Variant::Text(self.last_run_time.borrow().clone()),
            Property::NextRunTime => Variant::Text(String::new()),
            Property::LastTaskResult => Variant::Int(self.last_result.get()),
            Property::NumberOfMissedRuns => Variant::Int(0),
            Property::State => Variant::Int(self.state()?.as_raw() as i64),
            Property::Xml => self.definition.get(Property::XmlText)?,
            _ => return Err(member_not_found(&format!("{property:?}"))),
        };
        Ok(value)
    }

    fn put(&self, property: Property, value: Variant) -> Result<(), ServiceError> {
        match (property, value) {
            (Property::Enabled, Variant::Bool(enabled)) => self.set_enabled(enabled),
            (property, _) => Err(member_not_found(&format!("Writing {property:?}"))),
        }
    }

    fn get_object(&self, property: Property) -> Result<ObjectRef, ServiceError> {
        match property {
            Property::Definition => Ok(self.definition.clone()),
            _ => Err(member_not_found(&format!("Object {property:?}"))),
        }
    }

    fn put_object(&self, property: Property, _value: ObjectRef) -> Result<(), ServiceError> {
        Err(member_not_found(&format!("Object {property:?}")))
    }

    fn call(&self, method: Method) -> Result<Reply, ServiceError> {
        match method {
            Method::GetInstances(_) => Ok(Reply::Object(Rc::new(listing(self.running()?)))),
            Method::GetRunTimes { start, end, count } => self.run_times(&start, &end, count),
            Method::GetSecurityDescriptor(_) => {
                Ok(Reply::Value(Variant::Text(self.sddl.borrow().clone())))
            }
            Method::SetSecurityDescriptor { sddl, .. } => {
                *self.sddl.borrow_mut() = sddl;
                Ok(Reply::Unit)
            }
            Method::Run(_) | Method::RunEx { .. } => self.start(),
            Method::Stop(_) => self.stop(),
            method => Err(member_not_found(&format!("{method:?}"))),
        }
    }
}
