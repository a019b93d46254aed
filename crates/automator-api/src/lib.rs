//! # Automator API
//!
//! HTTP control surface for the Imagine automator.
//!
//! Every endpoint translates into a [`ControlCommand`] handed to the
//! [`ControlHandler`] the server was built with (the orchestrator in the
//! `automator` binary), and answers with the handler's [`ControlReply`].
//!
//! ## Endpoints
//!
//! | Method | Path                        | Command            |
//! |--------|-----------------------------|--------------------|
//! | POST   | `/jobs/{kind}/start`        | `start_media` / `start_edit` |
//! | POST   | `/jobs/{kind}/pause`        | `pause`            |
//! | POST   | `/jobs/{kind}/resume`       | `resume`           |
//! | POST   | `/jobs/{kind}/stop`         | `stop`             |
//! | GET    | `/jobs/{kind}`              | `get_state`        |
//! | GET    | `/jobs/{kind}/artifacts`    | `list_artifacts`   |
//! | DELETE | `/jobs/{kind}/artifacts`    | `clear_artifacts`  |
//! | POST   | `/jobs/{kind}/export`       | `export_all`       |
//! | PUT    | `/jobs/media/settings`      | `update_settings`  |
//! | GET    | `/tabs/{tab}/inspect`       | `inspect_page`     |
//! | GET    | `/health`                   | -                  |
//!
//! [`ControlCommand`]: automator_protocols::ControlCommand
//! [`ControlHandler`]: automator_protocols::ControlHandler
//! [`ControlReply`]: automator_protocols::ControlReply

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::routes::create_router;
pub use server::{ApiServer, ServerConfig};
pub use state::ApiState;
