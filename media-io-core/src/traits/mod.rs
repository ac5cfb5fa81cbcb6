pub mod codec;
pub mod device;
pub mod effect;
pub mod mixer;
pub mod recorder;
pub mod render;
pub mod unit;
