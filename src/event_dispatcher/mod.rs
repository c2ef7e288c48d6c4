use std::io;
use std::mem;

use evdev_rs::enums::{EV_ABS, EV_KEY, EventCode};

use crate::event_model::{OutgoingEvent, TabletState};
use crate::virtual_device::TabletSink;

/// 把事件攒成一组，一次性交给虚拟设备
///
/// 一个批次内的所有事件先排队，`flush` 时整组写出
pub struct Emitter<S> {
    sink: S,
    queue: Vec<OutgoingEvent>,
    unsynced_axes: bool,
}

impl<S: TabletSink> Emitter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            queue: Vec::new(),
            unsynced_axes: false,
        }
    }

    /// 完整状态: touch, 笔是否在范围内, 两个笔按钮, 然后 SYN_REPORT
    ///
    /// 永远发完整状态而不是差量，下游不会看到半截的组合
    pub fn emit_snapshot(&mut self, state: &TabletState) {
        self.queue.extend([
            key(EV_KEY::BTN_TOUCH, state.is_touching()),
            key(EV_KEY::BTN_TOOL_PEN, !state.is_away()),
            key(EV_KEY::BTN_STYLUS, state.buttons.upper),
            key(EV_KEY::BTN_STYLUS2, state.buttons.lower),
        ]);
        self.emit_sync();
    }

    /// 单独一个坐标轴的值，不附带 SYN_REPORT
    pub fn emit_axis(&mut self, axis: EV_ABS, value: i32) {
        self.queue
            .push(OutgoingEvent::new(EventCode::EV_ABS(axis), value));
        self.unsynced_axes = true;
    }

    pub fn emit_sync(&mut self) {
        self.queue.push(OutgoingEvent::sync());
        self.unsynced_axes = false;
    }

    /// 上一个 SYN_REPORT 之后是否还有坐标轴的值
    pub fn has_unsynced_axes(&self) -> bool {
        self.unsynced_axes
    }

    pub fn pending(&self) -> &[OutgoingEvent] {
        &self.queue
    }

    pub fn flush(&mut self) -> io::Result<()> {
        if self.queue.is_empty() {
            return Ok(());
        }
        let burst = mem::take(&mut self.queue);
        self.sink.emit(&burst)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

fn key(code: EV_KEY, pressed: bool) -> OutgoingEvent {
    OutgoingEvent::new(EventCode::EV_KEY(code), pressed as i32)
}
