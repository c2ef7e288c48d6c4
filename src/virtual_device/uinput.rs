use std::io;
use std::time::Duration;

use evdev_rs::{DeviceWrapper, EnableCodeData, InputEvent, TimeVal, UInputDevice, UninitDevice};
use tracing::info;

use super::capability::CapabilityDescriptor;
use crate::error::{Error, Result};
use crate::event_model::OutgoingEvent;

pub const UINPUT_PATH: &str = "/dev/uinput";

/// 虚拟设备的写入端
pub trait TabletSink {
    /// 按顺序写入整组事件，中途失败直接返回错误
    ///
    /// 不是原子的: uinput 一次只写一个 `input_event`，
    /// 中途出错时前面的事件已经写进去了，只是缺了结尾的 SYN_REPORT
    fn emit(&mut self, events: &[OutgoingEvent]) -> io::Result<()>;
}

/// 通过 uinput 创建出来的虚拟数位板，drop 时设备节点随之销毁
pub struct UinputTablet {
    device: UInputDevice,
}

impl UinputTablet {
    /// 创建设备并等待 `settle`
    ///
    /// 刚创建的设备节点 udev, libinput, Xorg, Wayland 都还没来得及看到，
    /// 这时候发出去的事件内核照发，但没有人在听，设备以后也不会再被识别
    pub async fn create(descriptor: &CapabilityDescriptor, settle: Duration) -> Result<Self> {
        descriptor.validate()?;

        let template = UninitDevice::new()
            .ok_or_else(|| io::Error::other("unable to allocate a libevdev device"))?;
        template.set_name(&descriptor.name);
        for prop in &descriptor.properties {
            template.enable_property(prop)?;
        }
        for (code, range) in descriptor.event_codes() {
            let data = range.map(|range| EnableCodeData::AbsInfo(range.to_abs_info()));
            template.enable_event_code(&code, data)?;
        }

        let device = UInputDevice::create_from_device(&template)
            .map_err(|err| Error::from_io(UINPUT_PATH, err))?;
        info!(
            "New device at {} ({})",
            device.devnode().unwrap_or("?"),
            device.syspath().unwrap_or("?")
        );

        tokio::time::sleep(settle).await;
        Ok(Self { device })
    }
}

impl TabletSink for UinputTablet {
    fn emit(&mut self, events: &[OutgoingEvent]) -> io::Result<()> {
        // 内核会重新打时间戳
        let time = TimeVal::new(0, 0);
        for event in events {
            self.device
                .write_event(&InputEvent::new(&time, &event.code, event.value))?;
        }
        Ok(())
    }
}
