pub mod pool;

pub use pool::create_client;
