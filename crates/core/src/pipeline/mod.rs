pub mod compositor;
pub mod tick_logger;
pub mod tick_scheduler;
