// idv-domain library entry point
pub mod capture;
pub mod device;
pub mod error;
pub mod flow_error;
pub mod session;
pub mod settings;
pub mod step_kind;
pub mod terms;
pub mod user_info;

pub use capture::{CapturedImage, ImageFormat};
pub use device::DeviceIdentity;
pub use error::DomainError;
pub use flow_error::FlowError;
pub use session::{Session, SessionAuth, SessionProgress};
pub use settings::VerificationSettings;
pub use step_kind::StepKind;
pub use terms::{sort_for_display, TermsCheckbox};
pub use user_info::{PredefinedUserInfo, UserInfo, DATE_OF_BIRTH_FORMAT};
