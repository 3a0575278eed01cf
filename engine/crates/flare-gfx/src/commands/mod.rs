pub mod command_pool;
pub mod fence;
pub mod semaphore;
