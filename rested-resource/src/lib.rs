pub mod config;
pub mod controller;
pub mod operation;
pub mod router;
pub mod session_controller;
pub mod shaper;

pub use config::{ResourceConfig, Timestamps};
pub use controller::{ResourceController, ResourceRequest};
pub use operation::Operation;
pub use router::resource_router;
pub use session_controller::{session_router, SessionController, SessionControllerConfig};
pub use shaper::{IdentityShaper, RecordShaper, StripFields};

pub mod prelude {
    //! Re-exports of the most commonly used resource types.
    pub use crate::{
        resource_router, session_router, RecordShaper, ResourceConfig, ResourceController,
        SessionController, StripFields,
    };
}
