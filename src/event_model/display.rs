use std::fmt;

use evdev_rs::enums::{EV_SYN, EventCode};
use evdev_rs::util::event_code_to_int;

use super::event::RawEvent;

/// 把一条原始事件渲染成 evtest 风格的一行
pub struct EventLine<'a>(pub &'a RawEvent);

impl fmt::Display for EventLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ev = self.0;
        write!(f, "Event: time {}.{:06}, ", ev.time.sec, ev.time.usec)?;
        match &ev.code {
            EventCode::EV_SYN(EV_SYN::SYN_MT_REPORT) => {
                write!(f, "++++++++++++++ {} ++++++++++++", ev.code)
            }
            EventCode::EV_SYN(EV_SYN::SYN_DROPPED) => {
                write!(f, ">>>>>>>>>>>>>> {} >>>>>>>>>>>>", ev.code)
            }
            EventCode::EV_SYN(_) => write!(f, "-------------- {} ------------", ev.code),
            code => {
                let (ty, num) = event_code_to_int(code);
                let name = code.to_string();
                write!(
                    f,
                    "type {:02x} {} code {:03x} {:20} value {:4}",
                    ty,
                    type_name(code),
                    num,
                    name,
                    ev.value
                )
            }
        }
    }
}

fn type_name(code: &EventCode) -> &'static str {
    match code {
        EventCode::EV_SYN(_) => "EV_SYN",
        EventCode::EV_KEY(_) => "EV_KEY",
        EventCode::EV_REL(_) => "EV_REL",
        EventCode::EV_ABS(_) => "EV_ABS",
        EventCode::EV_MSC(_) => "EV_MSC",
        EventCode::EV_SW(_) => "EV_SW",
        EventCode::EV_LED(_) => "EV_LED",
        EventCode::EV_SND(_) => "EV_SND",
        EventCode::EV_REP(_) => "EV_REP",
        EventCode::EV_FF(_) => "EV_FF",
        _ => "EV_UNK",
    }
}

#[cfg(test)]
mod tests {
    use evdev_rs::enums::{EV_ABS, EV_KEY};

    use super::*;
    use crate::event_model::Timestamp;

    fn at(code: EventCode, value: i32) -> RawEvent {
        RawEvent::at(Timestamp { sec: 12, usec: 345 }, code, value)
    }

    #[test]
    fn regular_event_line() {
        let line = EventLine(&at(EventCode::EV_ABS(EV_ABS::ABS_PRESSURE), 1000)).to_string();
        assert!(line.starts_with("Event: time 12.000345, type 03 EV_ABS code 018 ABS_PRESSURE"));
        assert!(line.ends_with("value 1000"));
    }

    #[test]
    fn key_event_line() {
        let line = EventLine(&at(EventCode::EV_KEY(EV_KEY::BTN_LEFT), 1)).to_string();
        assert!(line.contains("type 01 EV_KEY code 110 BTN_LEFT"));
    }

    #[test]
    fn sync_markers_are_distinct() {
        let report = EventLine(&at(EventCode::EV_SYN(EV_SYN::SYN_REPORT), 0)).to_string();
        let dropped = EventLine(&at(EventCode::EV_SYN(EV_SYN::SYN_DROPPED), 0)).to_string();
        assert!(report.ends_with("-------------- SYN_REPORT ------------"));
        assert!(dropped.ends_with(">>>>>>>>>>>>>> SYN_DROPPED >>>>>>>>>>>>"));
    }
}
