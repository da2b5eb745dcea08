use super::{
    actions::Action,
    definition::TaskDefinition,
    error::TaskError,
    principal::Principal,
    registration::RegistrationInfo,
    settings::TaskSettings,
    triggers::{Trigger, TriggerBase},
};
use crate::utils::{
    encoding::base64_encode_standard,
    time::{encode_instant, encode_offset, Instant, Offset},
};
use common::windows::{
    ActionSnapshot, PrincipalSnapshot, RegistrationSnapshot, RepetitionSnapshot,
    SettingsSnapshot, TaskSnapshot, TriggerDetails, TriggerSnapshot,
};

/// Read every part of a definition from the service
pub(crate) fn snapshot_definition(definition: &TaskDefinition) -> Result<TaskSnapshot, TaskError> {
    let mut triggers = Vec::new();
    for trigger in definition.triggers()?.iter()? {
        triggers.push(snapshot_trigger(&trigger)?);
    }

    let mut actions = Vec::new();
    for action in definition.actions()?.iter()? {
        actions.push(snapshot_action(&action)?);
    }

    let data = definition
        .data()?
        .map(|data| base64_encode_standard(data.as_bytes()));

    Ok(TaskSnapshot {
        registration_info: snapshot_registration(&definition.registration_info()?)?,
        principal: snapshot_principal(&definition.principal()?)?,
        settings: snapshot_settings(&definition.settings()?)?,
        triggers,
        actions,
        data,
    })
}

fn instant_text(instant: Option<Instant>) -> Option<String> {
    instant.map(|value| encode_instant(Some(value)))
}

fn offset_text(offset: Option<Offset>) -> Option<String> {
    offset.map(|value| encode_offset(Some(value)))
}

fn snapshot_registration(info: &RegistrationInfo) -> Result<RegistrationSnapshot, TaskError> {
    Ok(RegistrationSnapshot {
        uri: info.uri()?,
        author: info.author()?,
        description: info.description()?,
        documentation: info.documentation()?,
        source: info.source()?,
        version: info.version()?,
        date: instant_text(info.date()?),
    })
}

fn snapshot_principal(principal: &Principal) -> Result<PrincipalSnapshot, TaskError> {
    Ok(PrincipalSnapshot {
        id: principal.id()?,
        user_id: principal.user_id()?,
        group_id: principal.group_id()?,
        display_name: principal.display_name()?,
        logon_type: principal.logon_type()?,
        run_level: principal.run_level()?,
    })
}

fn snapshot_settings(settings: &TaskSettings) -> Result<SettingsSnapshot, TaskError> {
    Ok(SettingsSnapshot {
        enabled: settings.enabled()?,
        hidden: settings.hidden()?,
        allow_demand_start: settings.allow_demand_start()?,
        allow_hard_terminate: settings.allow_hard_terminate()?,
        compatibility: settings.compatibility()?,
        multiple_instances: settings.multiple_instances()?,
        priority: settings.priority()?,
        execution_time_limit: offset_text(settings.execution_time_limit()?),
        delete_expired_task_after: offset_text(settings.delete_expired_task_after()?),
        restart_count: settings.restart_count()?,
        restart_interval: offset_text(settings.restart_interval()?),
        start_when_available: settings.start_when_available()?,
        run_only_if_idle: settings.run_only_if_idle()?,
        run_only_if_network_available: settings.run_only_if_network_available()?,
        disallow_start_if_on_batteries: settings.disallow_start_if_on_batteries()?,
        stop_if_going_on_batteries: settings.stop_if_going_on_batteries()?,
        wake_to_run: settings.wake_to_run()?,
    })
}

fn snapshot_repetition(base: &TriggerBase) -> Result<Option<RepetitionSnapshot>, TaskError> {
    let repetition = base.repetition()?;
    let interval = repetition.interval()?;
    let duration = repetition.duration()?;
    let stop_at_duration_end = repetition.stop_at_duration_end()?;
    if interval.is_none() && duration.is_none() && !stop_at_duration_end {
        return Ok(None);
    }
    Ok(Some(RepetitionSnapshot {
        interval: offset_text(interval),
        duration: offset_text(duration),
        stop_at_duration_end,
    }))
}

fn snapshot_trigger(trigger: &Trigger) -> Result<TriggerSnapshot, TaskError> {
    let details = match trigger {
        Trigger::Event(event) => TriggerDetails::Event {
            subscription: event.subscription()?,
            delay: offset_text(event.delay()?),
            value_queries: event.value_queries()?.to_map()?,
        },
        Trigger::Time(time) => TriggerDetails::Time {
            random_delay: offset_text(time.random_delay()?),
        },
        Trigger::Daily(daily) => TriggerDetails::Daily {
            days_interval: daily.days_interval()?,
            random_delay: offset_text(daily.random_delay()?),
        },
        Trigger::Weekly(weekly) => TriggerDetails::Weekly {
            weeks_interval: weekly.weeks_interval()?,
            days_of_week: weekly.days_of_week()?.names(),
            random_delay: offset_text(weekly.random_delay()?),
        },
        Trigger::Monthly(monthly) => TriggerDetails::Monthly {
            days_of_month: monthly.days_of_month()?.names(),
            months_of_year: monthly.months_of_year()?.names(),
            run_on_last_day_of_month: monthly.run_on_last_day_of_month()?,
            random_delay: offset_text(monthly.random_delay()?),
        },
        Trigger::MonthlyDow(monthly) => TriggerDetails::MonthlyDow {
            days_of_week: monthly.days_of_week()?.names(),
            weeks_of_month: monthly.weeks_of_month()?.names(),
            months_of_year: monthly.months_of_year()?.names(),
            run_on_last_week_of_month: monthly.run_on_last_week_of_month()?,
            random_delay: offset_text(monthly.random_delay()?),
        },
        Trigger::Idle(_) => TriggerDetails::Idle,
        Trigger::Registration(registration) => TriggerDetails::Registration {
            delay: offset_text(registration.delay()?),
        },
        Trigger::Boot(boot) => TriggerDetails::Boot {
            delay: offset_text(boot.delay()?),
        },
        Trigger::Logon(logon) => TriggerDetails::Logon {
            delay: offset_text(logon.delay()?),
            user_id: logon.user_id()?,
        },
        Trigger::SessionStateChange(session) => TriggerDetails::SessionStateChange {
            delay: offset_text(session.delay()?),
            user_id: session.user_id()?,
            state_change: session.state_change()?,
        },
    };

    let base = trigger.base();
    Ok(TriggerSnapshot {
        id: base.id()?,
        enabled: base.enabled()?,
        start_boundary: instant_text(base.start_boundary()?),
        end_boundary: instant_text(base.end_boundary()?),
        execution_time_limit: offset_text(base.execution_time_limit()?),
        repetition: snapshot_repetition(base)?,
        details,
    })
}

fn snapshot_action(action: &Action) -> Result<ActionSnapshot, TaskError> {
    let snapshot = match action {
        Action::Exec(exec) => ActionSnapshot::Exec {
            id: action.id()?,
            path: exec.path()?,
            arguments: exec.arguments()?,
            working_directory: exec.working_directory()?,
        },
        Action::ComHandler(handler) => ActionSnapshot::ComHandler {
            id: action.id()?,
            class_id: handler.class_id()?,
            data: handler.data()?,
        },
        Action::SendEmail(email) => ActionSnapshot::SendEmail {
            id: action.id()?,
            server: email.server()?,
            from: email.from()?,
            to: email.to()?,
            cc: email.cc()?,
            bcc: email.bcc()?,
            reply_to: email.reply_to()?,
            subject: email.subject()?,
            body: email.body()?,
            attachments: email.attachments()?,
            header_fields: email.header_fields()?.to_map()?,
        },
        Action::ShowMessage(message) => ActionSnapshot::ShowMessage {
            id: action.id()?,
            title: message.title()?,
            body: message.message_body()?,
        },
    };
    Ok(snapshot)
}
