use std::fmt::Write;

use evdev_rs::enums::{EventCode, EventType, InputProp};
use evdev_rs::util::{event_code_to_int, int_to_event_code};
use evdev_rs::{Device, DeviceWrapper};

const EVENT_TYPES: &[(EventType, u32)] = &[
    (EventType::EV_SYN, 0x0f),
    (EventType::EV_KEY, 0x2ff),
    (EventType::EV_REL, 0x0f),
    (EventType::EV_ABS, 0x3f),
    (EventType::EV_MSC, 0x07),
    (EventType::EV_SW, 0x10),
    (EventType::EV_LED, 0x0f),
    (EventType::EV_SND, 0x07),
    (EventType::EV_REP, 0x01),
    (EventType::EV_FF, 0x7f),
];

const PROPERTIES: &[InputProp] = &[
    InputProp::INPUT_PROP_POINTER,
    InputProp::INPUT_PROP_DIRECT,
    InputProp::INPUT_PROP_BUTTONPAD,
    InputProp::INPUT_PROP_SEMI_MT,
    InputProp::INPUT_PROP_TOPBUTTONPAD,
    InputProp::INPUT_PROP_POINTING_STICK,
    InputProp::INPUT_PROP_ACCELEROMETER,
];

/// 设备支持的某一类事件码
pub(crate) fn supported_codes(device: &Device, ty: EventType) -> impl Iterator<Item = EventCode> + '_ {
    let max = EVENT_TYPES
        .iter()
        .find(|(known, _)| *known == ty)
        .map_or(0, |(_, max)| *max);
    (0..=max)
        .map(move |code| int_to_event_code(ty as u32, code))
        .filter(move |code| device.has_event_code(code))
}

/// evtest 风格的设备能力描述，只用来给人看
pub fn describe(device: &Device) -> String {
    let mut out = String::new();
    // 写 String 不会失败
    let _ = write_description(&mut out, device);
    out
}

fn write_description(out: &mut String, device: &Device) -> std::fmt::Result {
    let v = device.driver_version();
    writeln!(
        out,
        "Input driver version is {}.{}.{}",
        v >> 16,
        (v >> 8) & 0xff,
        v & 0xff
    )?;
    writeln!(
        out,
        "Input device ID: bus {:#x} vendor {:#x} product {:#x} version {:#x}",
        device.bustype(),
        device.vendor_id(),
        device.product_id(),
        device.version()
    )?;
    writeln!(out, "Input device name: {}", device.name().unwrap_or(""))?;
    writeln!(out, "Supported events:")?;

    for (ty, _) in EVENT_TYPES {
        if !device.has_event_type(ty) {
            continue;
        }
        writeln!(out, "  Event type {} ({})", *ty as u32, ty)?;
        for code in supported_codes(device, *ty) {
            let (_, num) = event_code_to_int(&code);
            match ty {
                EventType::EV_LED | EventType::EV_SND | EventType::EV_SW => {
                    let state = device.event_value(&code).unwrap_or(0);
                    writeln!(out, "    Event code {num} ({code}) state {state}")?;
                }
                _ => writeln!(out, "    Event code {num} ({code})")?,
            }
            if *ty == EventType::EV_ABS {
                if let Some(info) = device.abs_info(&code) {
                    for (label, value) in [
                        ("Value", info.value),
                        ("Minimum", info.minimum),
                        ("Maximum", info.maximum),
                        ("Fuzz", info.fuzz),
                        ("Flat", info.flat),
                        ("Resolution", info.resolution),
                    ] {
                        writeln!(out, "       {label:10} {value:6}")?;
                    }
                }
            }
        }
    }

    writeln!(out, "Properties:")?;
    for prop in PROPERTIES {
        if device.has_property(prop) {
            writeln!(out, "  Property type {} ({})", *prop as u32, prop)?;
        }
    }
    Ok(())
}
