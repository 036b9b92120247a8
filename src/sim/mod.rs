pub mod draw;
pub mod event;
pub mod log;
pub mod message;
pub mod step;
pub mod world;
