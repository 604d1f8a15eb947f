mod enroll;
mod login;
mod logout;

pub use enroll::{EnrollCredentialAction, EnrollCredentialInput};
pub use login::{LoginAction, LoginOutcome};
pub use logout::LogoutAction;
