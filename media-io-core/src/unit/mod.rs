mod codec_adapter;
pub mod effects;
pub mod media_unit;

pub use effects::EffectRegistry;
pub use media_unit::{AttachErrorHandler, MediaUnit};

pub(crate) use media_unit::UnitCommand;
