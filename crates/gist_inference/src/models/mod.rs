pub mod chat;
pub mod dummy;

pub use chat::ChatModel;
pub use dummy::DummyModel;
