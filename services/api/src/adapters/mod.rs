pub mod http_publisher;
pub mod memory_publisher;

pub use http_publisher::HttpPublisher;
pub use memory_publisher::MemoryPublisher;
