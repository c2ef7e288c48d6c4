/// 虚拟数位板需要声明的能力
pub mod capability;

/// uinput 虚拟设备
pub mod uinput;

pub use capability::{AxisRange, CapabilityDescriptor};
pub use uinput::{TabletSink, UinputTablet};
