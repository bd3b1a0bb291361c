//! Challenge Module
//!
//! Gates safety-significant commands behind a PIN and an explicit
//! acknowledgment, as configured per device.

mod gate;

pub use gate::{check_ack, check_pin};
