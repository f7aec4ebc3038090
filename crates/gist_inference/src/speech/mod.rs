pub mod dummy;
pub mod unreal;

pub use dummy::DummySynthesizer;
pub use unreal::UnrealSpeech;
