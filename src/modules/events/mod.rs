mod bus;

pub use bus::{run_event_logger, AppEvent, AppEvents, BroadcastEvents, EventError};
