pub mod consumer;
pub mod dispatch;
pub mod provider;

pub use consumer::EndpointConsumer;
pub use dispatch::dispatch;
pub use provider::EndpointProvider;
