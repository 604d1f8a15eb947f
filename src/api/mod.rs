//! Wire types shared by every HTTP integration, plus the axum adapter.

mod types;

pub use types::*;

#[cfg(feature = "axum_api")]
pub mod axum;
