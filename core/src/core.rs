use crate::{
    service::object::ObjectRef,
    structs::toml::SchedulerToml,
    tasks::scheduler::TaskService,
    utils::{error::ConfigError, logging::setup_logging},
};
use log::{error, info};

/// Read the TOML config at provided path, install logging and connect to the service behind `backend`
pub fn connect_from_toml(path: &str, backend: ObjectRef) -> Result<TaskService, ConfigError> {
    let config = SchedulerToml::read_scheduler_toml(path)?;
    connect_with_config(&config, backend)
}

/// Same as `connect_from_toml` for already read TOML data
pub fn connect_from_toml_data(data: &[u8], backend: ObjectRef) -> Result<TaskService, ConfigError> {
    let config = SchedulerToml::parse_scheduler_toml(data)?;
    connect_with_config(&config, backend)
}

fn connect_with_config(
    config: &SchedulerToml,
    backend: ObjectRef,
) -> Result<TaskService, ConfigError> {
    setup_logging(config.logging.as_ref())?;

    let service = TaskService::new(backend);
    let connection = config.connection.as_ref();
    let result = service.connect(
        connection.and_then(|options| options.server.as_deref()),
        connection.and_then(|options| options.user.as_deref()),
        connection.and_then(|options| options.domain.as_deref()),
        connection.and_then(|options| options.password.as_deref()),
    );
    match result {
        Ok(_) => info!("[taskschd] Connected using TOML config"),
        Err(err) => {
            error!("[taskschd] Failed to connect using TOML config: {err:?}");
            return Err(ConfigError::Connect);
        }
    }
    Ok(service)
}
