//! Rested: pluggable REST resource controllers over Axum.
//!
//! This facade crate re-exports the Rested sub-crates through a single
//! dependency with feature flags:
//!
//! ```ignore
//! use rested::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature    | Default | Crate             |
//! |------------|---------|-------------------|
//! | `security` | **yes** | `rested-security` |
//! | `resource` | **yes** | `rested-resource` |
//! | `test`     | no      | `rested-test`     |
//! | `full`     | no      | All of the above  |

// Re-export everything from rested-core at the top level for convenience.
pub use rested_core::*;

pub use rested_data;

#[cfg(feature = "security")]
pub use rested_security;

#[cfg(feature = "resource")]
pub use rested_resource;

#[cfg(feature = "test")]
pub use rested_test;

pub mod prelude {
    //! Re-exports of the most commonly used types across all Rested crates.
    pub use rested_core::prelude::*;
    pub use rested_core::{init_tracing, CorsMode};
    pub use rested_data::prelude::*;

    #[cfg(feature = "security")]
    pub use rested_security::prelude::*;

    #[cfg(feature = "resource")]
    pub use rested_resource::prelude::*;

    #[cfg(feature = "test")]
    pub use rested_test::TestApp;
}
