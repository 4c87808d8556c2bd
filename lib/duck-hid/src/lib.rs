//! USB HID gadget plumbing for the duck script runner.
//!
//! Keyboard and mouse state is collected into boot protocol reports and
//! flushed to the `/dev/hidgN` endpoints created by the gadget configuration.

pub mod key;
pub mod locale;
pub mod mouse;
mod hid;
pub use hid::HID;
