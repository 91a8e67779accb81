pub mod agent;
pub mod task;
pub mod ticket;
