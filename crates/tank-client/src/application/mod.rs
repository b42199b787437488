//! Application layer for the control client.
//!
//! - **`telemetry`** – [`TelemetryStore`](telemetry::TelemetryStore), the one
//!   owner of position, pressure and connectivity, and the read-only
//!   [`TelemetryView`](telemetry::TelemetryView) handed to everyone else.
//!
//! - **`notices`** – Transient operator notices that expire after a fixed
//!   display window.
//!
//! - **`ports`** – Traits the dispatcher talks through: the best-effort
//!   [`CommandLink`](ports::CommandLink) and the request/response
//!   [`SideChannel`](ports::SideChannel).  Implementations live in the
//!   infrastructure layer.
//!
//! - **`dispatcher`** – Operator actions and where each one travels.
//!
//! - **`input_router`** – Key events to commands.

pub mod dispatcher;
pub mod input_router;
pub mod notices;
pub mod ports;
pub mod telemetry;
