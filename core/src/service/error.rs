use std::fmt;

/// The system cannot find the file specified
pub const ERROR_FILE_NOT_FOUND: u32 = 0x8007_0002;
/// The system cannot find the path specified
pub const ERROR_PATH_NOT_FOUND: u32 = 0x8007_0003;
pub const ERROR_ALREADY_EXISTS: u32 = 0x8007_00B7;
pub const ERROR_DIR_NOT_EMPTY: u32 = 0x8007_0091;
/// Collection index out of range
pub const DISP_E_BADINDEX: u32 = 0x8002_000B;
pub const E_INVALIDARG: u32 = 0x8007_0057;
pub const DISP_E_TYPEMISMATCH: u32 = 0x8002_0005;
pub const DISP_E_MEMBERNOTFOUND: u32 = 0x8002_0003;
pub const E_ACCESSDENIED: u32 = 0x8007_0005;
/// Connect has not been called
pub const SCHED_E_SERVICE_NOT_RUNNING: u32 = 0x8004_1315;
pub const SCHED_E_TASK_DISABLED: u32 = 0x8004_1326;

/// Failure reported by the task scheduling service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// HRESULT style status code
    pub code: u32,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: u32, message: &str) -> ServiceError {
        ServiceError {
            code,
            message: message.to_string(),
        }
    }

    /// Check if the service failed with the provided status code
    pub fn is(&self, code: u32) -> bool {
        self.code == code
    }

    /// Either of the not found statuses. The service uses both for missing folders and tasks
    pub fn is_not_found(&self) -> bool {
        self.is(ERROR_FILE_NOT_FOUND) || self.is(ERROR_PATH_NOT_FOUND)
    }
}

impl std::error::Error for ServiceError {}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service call failed ({:#010x}): {}", self.code, self.message)
    }
}
