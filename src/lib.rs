/// 虚拟数位板，交给内核的 uinput 接口
pub mod virtual_device;

/// 把翻译好的事件整组写给虚拟数位板
pub mod event_dispatcher;

/// 事件翻译的状态机
pub mod tablet_driver;

/// 物理输入设备 (/dev/input/eventX)
pub mod input_devices;

/// 主循环: 读取, 翻译, 写出，以及溢出后的重新同步
pub mod event_router;

/// 原始事件和数位板状态的数据模型
pub mod event_model;

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};

// 物理设备只暴露了一部分数位板语义: BTN_LEFT 充当笔尖接触，外加 X/Y/压感。
// 桌面环境看到这种设备只会当成一个奇怪的绝对鼠标，
// 所以这里再造一个完整的虚拟数位板，把事件翻译过去

// 对外发出的事件永远是完整状态 + SYN_REPORT，不发差量。
// libinput 遇到「接触但不在范围内」或者「在范围内却一直没有离开」这种状态会直接卡住

// 坐标轴只转发不强制 SYN_REPORT，见 `tablet_driver::SyncPolicy`

// TODO: 物理设备上的其他按键映射到两个笔按钮，现在只能通过 `Translator::press_button` 调用
