pub mod check;
pub mod forwarder;
pub mod keyboard;
pub mod matrix;
pub mod notes;
pub mod playback;
pub mod status;
pub mod stdin_handler;
pub mod transpose;
