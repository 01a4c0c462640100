pub mod error;
pub mod password;
pub mod session;
pub mod token;

pub use error::SecurityError;
pub use password::{Argon2Password, PasswordAdapter, Passwords};
pub use session::{Session, SessionAdapter, SessionGrant, Sessions};
pub use token::{extract_token, TokenSession, TokenSessionConfig};

#[doc(hidden)]
pub use password::ErasedPassword;
#[doc(hidden)]
pub use session::ErasedSession;

pub mod prelude {
    //! Re-exports of the most commonly used security types.
    pub use crate::{Argon2Password, Passwords, Session, SessionAdapter, Sessions, TokenSession};
}
