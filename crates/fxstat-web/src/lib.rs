//! # fxstat Web
//!
//! HTTP surface for fxstat: the `/finance` statistics endpoint, chart data
//! for the dashboard, a health endpoint and the dashboard page itself.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Dashboard page |
//! | `GET /finance` | Totals, optional per-day breakdown and request metadata |
//! | `GET /api/rates` | Chart series for the dashboard |
//! | `GET /health` | Liveness and per-source readiness |

pub mod config;
pub mod error;
pub mod routes;

pub use config::Config;
pub use error::{ApiError, AppError};
pub use routes::{app, AppState};
