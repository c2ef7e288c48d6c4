/// 启动时打印的设备信息
pub mod describe;

/// 基于 libevdev 的物理设备读取
pub mod evdev;

pub use describe::describe;
pub use evdev::{Batch, EvdevSource, EventSource, Framer};
