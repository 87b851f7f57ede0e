//! The out-of-core admin HTTP surface (C9): a thin `axum` router over the
//! routes in spec §6. `/version`, `/info`, `/health` are public; everything
//! else sits behind the bearer-token scheme. `/consensus/*` are stubs — the
//! peer layer's own HTTP transport (ledger-peer) carries the real traffic.

mod auth;
mod error;
mod routes;
mod server;
mod state;

pub use auth::BearerTokens;
pub use error::ApiError;
pub use server::{build_router, run};
pub use state::ApiState;
