use std::time::Instant;

use evdev_rs::InputEvent;
use evdev_rs::enums::{EV_SYN, EventCode};
use num_enum::FromPrimitive;

/// 内核给出的事件时间 (`struct timeval`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamp {
    pub sec: i64,
    pub usec: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Key,
    Absolute,
    Sync,
    Other,
}

/// 从物理设备读到的一条原始事件，读出之后就不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub time: Timestamp,
    pub code: EventCode,
    pub value: i32,
}

impl RawEvent {
    pub fn new(code: EventCode, value: i32) -> Self {
        Self::at(Timestamp::default(), code, value)
    }

    pub fn at(time: Timestamp, code: EventCode, value: i32) -> Self {
        Self { time, code, value }
    }

    pub fn category(&self) -> Category {
        match self.code {
            EventCode::EV_KEY(_) => Category::Key,
            EventCode::EV_ABS(_) => Category::Absolute,
            EventCode::EV_SYN(_) => Category::Sync,
            _ => Category::Other,
        }
    }

    pub fn is_sync_report(&self) -> bool {
        matches!(self.code, EventCode::EV_SYN(EV_SYN::SYN_REPORT))
    }
}

impl From<&InputEvent> for RawEvent {
    fn from(ev: &InputEvent) -> Self {
        Self {
            time: Timestamp {
                sec: ev.time.tv_sec as i64,
                usec: ev.time.tv_usec as i64,
            },
            code: ev.event_code.clone(),
            value: ev.value,
        }
    }
}

/// 按键事件的取值，`2` 是内核的自动重复
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(i32)]
pub enum KeyState {
    Released = 0,
    #[default]
    Pressed = 1,
    Repeated = 2,
}

impl KeyState {
    pub fn is_down(self) -> bool {
        !matches!(self, Self::Released)
    }
}

/// 写给虚拟设备的一条事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEvent {
    pub code: EventCode,
    pub value: i32,
}

impl OutgoingEvent {
    pub fn new(code: EventCode, value: i32) -> Self {
        Self { code, value }
    }

    pub fn sync() -> Self {
        Self::new(EventCode::EV_SYN(EV_SYN::SYN_REPORT), 0)
    }

    pub fn is_sync(&self) -> bool {
        matches!(self.code, EventCode::EV_SYN(EV_SYN::SYN_REPORT))
    }
}

/// 笔相对于板面的位置
///
/// `Leaved` 时不可能是按下状态，所以「离开但接触」这种组合根本表示不出来
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PenLocation {
    #[default]
    Leaved,
    Floating,
    Pressed,
}

/// 笔身上的两个按钮, `upper` 对应 BTN_STYLUS, `lower` 对应 BTN_STYLUS2
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PenButton {
    pub upper: bool,
    pub lower: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylusButton {
    Upper,
    Lower,
}

impl PenButton {
    pub fn set(&mut self, button: StylusButton, pressed: bool) {
        match button {
            StylusButton::Upper => self.upper = pressed,
            StylusButton::Lower => self.lower = pressed,
        }
    }
}

/// 虚拟数位板当前对外呈现的状态，只有 `Translator` 会修改它
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabletState {
    pub location: PenLocation,
    pub buttons: PenButton,
    pub last_modified: Option<Instant>,
}

impl TabletState {
    pub fn from_flags(away: bool, touching: bool, buttons: PenButton) -> Self {
        // 接触一定意味着在感应范围内
        let location = match (away, touching) {
            (_, true) => PenLocation::Pressed,
            (false, false) => PenLocation::Floating,
            (true, false) => PenLocation::Leaved,
        };
        Self {
            location,
            buttons,
            last_modified: None,
        }
    }

    pub fn is_away(&self) -> bool {
        self.location == PenLocation::Leaved
    }

    pub fn is_touching(&self) -> bool {
        self.location == PenLocation::Pressed
    }

    pub fn set_touching(&mut self, touching: bool) {
        self.location = if touching {
            PenLocation::Pressed
        } else {
            PenLocation::Floating
        };
    }

    pub fn mark_present(&mut self) {
        if self.location == PenLocation::Leaved {
            self.location = PenLocation::Floating;
        }
    }

    pub fn mark_away(&mut self) {
        self.location = PenLocation::Leaved;
    }

    pub fn touch(&mut self) {
        self.last_modified = Some(Instant::now());
    }
}
