pub mod client_config;
pub mod course;
pub mod department;
pub mod json_error;
pub mod register;
pub mod stats;
pub mod user;

pub use self::client_config::{ClientConfig, ConfigError};
pub use self::course::{Course, CourseForm, CourseList};
pub use self::department::{Department, DepartmentForm};
pub use self::json_error::ApiMessage;
pub use self::register::RegistrationForm;
pub use self::stats::Statistics;
pub use self::user::{CredentialRecord, Role, SelfProfile, User, UserUpdate};
