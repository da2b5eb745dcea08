use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct SchedulerToml {
    pub connection: Option<Connection>,
    pub logging: Option<Logging>,
}

/// Credentials passed to the service on connect. Missing values use the current user and machine
#[derive(Debug, Deserialize, Default)]
pub struct Connection {
    pub server: Option<String>,
    pub user: Option<String>,
    pub domain: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Logging {
    /**One of: error, warn, info, debug. Defaults to warn */
    pub level: Option<String>,
    /**Write logs to this directory instead of the console */
    pub directory: Option<String>,
}
