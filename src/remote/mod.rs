pub mod osc_listener;
pub mod osc_sender;
