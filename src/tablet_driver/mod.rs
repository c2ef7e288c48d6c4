//! 把物理设备的原始事件翻译成完整的数位板事件
//!
//! 物理设备只有 BTN_LEFT 代表笔尖接触，加上 X/Y/压感三个绝对轴。
//! 坐标和压感原样转发，接触和笔按钮的变化每次都发一组完整状态

use std::io;

use evdev_rs::enums::{EV_ABS, EV_KEY, EV_SYN, EventCode};
use num_enum::FromPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event_dispatcher::Emitter;
use crate::event_model::{EventLine, KeyState, PenButton, RawEvent, StylusButton, TabletState};
use crate::virtual_device::TabletSink;

/// 物理设备上代表笔尖接触的按键
pub const CONTACT_KEY: EV_KEY = EV_KEY::BTN_LEFT;

/// 物理设备发来的 SYN_REPORT 怎么处理
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPolicy {
    /// 上一个 SYN_REPORT 之后排了坐标轴的值才转发，否则丢掉
    #[default]
    FlushPending,
    /// 一律丢掉，坐标轴的值要等下一次状态变化才会被提交
    Drop,
}

pub struct Translator {
    state: TabletState,
    sync_policy: SyncPolicy,
    dropped: u64,
}

impl Translator {
    pub fn new(sync_policy: SyncPolicy) -> Self {
        Self {
            state: TabletState::default(),
            sync_policy,
            dropped: 0,
        }
    }

    pub fn state(&self) -> &TabletState {
        &self.state
    }

    /// 无法识别而被丢掉的事件数
    pub fn dropped_events(&self) -> u64 {
        self.dropped
    }

    /// 翻译一个批次，全部排好队之后一次写出
    pub fn translate_batch<S: TabletSink>(
        &mut self,
        events: &[RawEvent],
        out: &mut Emitter<S>,
    ) -> io::Result<()> {
        for event in events {
            self.handle_event(event, out);
        }
        out.flush()
    }

    pub fn handle_event<S: TabletSink>(&mut self, event: &RawEvent, out: &mut Emitter<S>) {
        match &event.code {
            EventCode::EV_ABS(axis @ (EV_ABS::ABS_PRESSURE | EV_ABS::ABS_X | EV_ABS::ABS_Y)) => {
                out.emit_axis(*axis, event.value);
            }
            EventCode::EV_KEY(CONTACT_KEY) => {
                if KeyState::from_primitive(event.value).is_down() {
                    self.touch_press(out);
                } else {
                    self.touch_release(out);
                }
            }
            EventCode::EV_SYN(EV_SYN::SYN_REPORT) => {
                if self.sync_policy == SyncPolicy::FlushPending && out.has_unsynced_axes() {
                    out.emit_sync();
                }
            }
            _ => {
                self.dropped += 1;
                debug!("Unknown event: {}", EventLine(event));
            }
        }
    }

    /// 缓冲区溢出之后，按快照重建状态，再发一组完整状态
    ///
    /// 结果只取决于快照本身，和溢出之前的状态无关
    pub fn resync<S: TabletSink>(
        &mut self,
        snapshot: &[RawEvent],
        out: &mut Emitter<S>,
    ) -> io::Result<()> {
        let mut touching = false;
        let mut in_range = None;
        let mut buttons = PenButton::default();

        for event in snapshot {
            let down = KeyState::from_primitive(event.value).is_down();
            match &event.code {
                EventCode::EV_KEY(CONTACT_KEY) => touching = down,
                EventCode::EV_KEY(EV_KEY::BTN_TOOL_PEN) => in_range = Some(down),
                EventCode::EV_KEY(EV_KEY::BTN_STYLUS) => buttons.upper = down,
                EventCode::EV_KEY(EV_KEY::BTN_STYLUS2) => buttons.lower = down,
                EventCode::EV_ABS(axis @ (EV_ABS::ABS_PRESSURE | EV_ABS::ABS_X | EV_ABS::ABS_Y)) => {
                    out.emit_axis(*axis, event.value);
                }
                _ => {}
            }
        }

        // 快照里没有 BTN_TOOL_PEN 时，只有接触才能说明笔在范围内
        let away = !in_range.unwrap_or(touching);
        self.state = TabletState::from_flags(away, touching, buttons);
        self.state.touch();
        debug!(
            "Resynced: Away: {}, Touching: {}",
            self.state.is_away(),
            self.state.is_touching()
        );
        out.emit_snapshot(&self.state);
        out.flush()
    }

    pub fn touch_press<S: TabletSink>(&mut self, out: &mut Emitter<S>) {
        self.state.set_touching(true);
        self.send_state(out);
    }

    pub fn touch_release<S: TabletSink>(&mut self, out: &mut Emitter<S>) {
        self.state.set_touching(false);
        self.send_state(out);
    }

    pub fn press_button<S: TabletSink>(&mut self, button: StylusButton, out: &mut Emitter<S>) {
        self.state.buttons.set(button, true);
        self.send_state(out);
    }

    pub fn release_button<S: TabletSink>(&mut self, button: StylusButton, out: &mut Emitter<S>) {
        self.state.buttons.set(button, false);
        self.send_state(out);
    }

    /// 先报告笔靠近，再报告笔离开
    ///
    /// 有些 X11 环境要先见过一次 BTN_TOOL_PEN 才会把这支笔列出来，
    /// 第二组把状态恢复成初始的离开状态
    pub fn announce<S: TabletSink>(&mut self, out: &mut Emitter<S>) -> io::Result<()> {
        self.state.mark_present();
        self.emit_state(out);
        self.state.mark_away();
        self.emit_state(out);
        out.flush()
    }

    fn send_state<S: TabletSink>(&mut self, out: &mut Emitter<S>) {
        // 任何状态变化都意味着笔在范围内
        self.state.mark_present();
        self.emit_state(out);
    }

    fn emit_state<S: TabletSink>(&mut self, out: &mut Emitter<S>) {
        self.state.touch();
        debug!(
            "Away: {}, Touching: {}",
            self.state.is_away(),
            self.state.is_touching()
        );
        out.emit_snapshot(&self.state);
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(SyncPolicy::default())
    }
}
