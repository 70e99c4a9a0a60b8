pub mod history;
pub mod platform;
pub mod record;
pub mod sampler;
pub mod scheduler;
pub mod source;
pub mod terminate;
