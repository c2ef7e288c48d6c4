use evdev_rs::AbsInfo;
use evdev_rs::enums::{EV_ABS, EV_KEY, EV_SYN, EventCode, InputProp};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};

pub const DEFAULT_NAME: &str = "Tablet alone";

// 少了其中任何一个，libinput / Xorg 都不会把它当成数位板
pub const REQUIRED_PROPS: &[InputProp] = &[InputProp::INPUT_PROP_DIRECT];

pub const REQUIRED_KEYS: &[EV_KEY] = &[
    EV_KEY::BTN_TOOL_PEN,
    EV_KEY::BTN_TOOL_RUBBER,
    EV_KEY::BTN_TOUCH,
    EV_KEY::BTN_STYLUS,
    EV_KEY::BTN_STYLUS2,
];

pub const REQUIRED_AXES: &[EV_ABS] = &[EV_ABS::ABS_X, EV_ABS::ABS_Y, EV_ABS::ABS_PRESSURE];

pub const REQUIRED_SYNCS: &[EV_SYN] = &[EV_SYN::SYN_REPORT, EV_SYN::SYN_DROPPED];

/// 一根绝对坐标轴的范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
    #[serde(default)]
    pub fuzz: i32,
    #[serde(default)]
    pub flat: i32,
    #[serde(default)]
    pub resolution: i32,
}

impl AxisRange {
    pub const POSITION: Self = Self {
        min: 0,
        max: 32767,
        fuzz: 0,
        flat: 0,
        resolution: 100,
    };

    pub const PRESSURE: Self = Self {
        min: 0,
        max: 8191,
        fuzz: 0,
        flat: 0,
        resolution: 0,
    };

    pub fn to_abs_info(self) -> AbsInfo {
        AbsInfo {
            value: self.min,
            minimum: self.min,
            maximum: self.max,
            fuzz: self.fuzz,
            flat: self.flat,
            resolution: self.resolution,
        }
    }
}

/// 虚拟数位板声明的能力
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityDescriptor {
    pub name: String,
    pub properties: Vec<InputProp>,
    pub axes: Vec<(EV_ABS, AxisRange)>,
    pub keys: Vec<EV_KEY>,
    pub syncs: Vec<EV_SYN>,
}

impl CapabilityDescriptor {
    pub fn build() -> Self {
        Self::with_axes(DEFAULT_NAME, AxisRange::POSITION, AxisRange::POSITION, AxisRange::PRESSURE)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let descriptor = Self::with_axes(
            &config.device.name,
            config.axes.x,
            config.axes.y,
            config.axes.pressure,
        );
        descriptor.validate()?;
        Ok(descriptor)
    }

    fn with_axes(name: &str, x: AxisRange, y: AxisRange, pressure: AxisRange) -> Self {
        Self {
            name: name.to_string(),
            properties: REQUIRED_PROPS.to_vec(),
            axes: vec![
                (EV_ABS::ABS_X, x),
                (EV_ABS::ABS_Y, y),
                (EV_ABS::ABS_PRESSURE, pressure),
            ],
            keys: REQUIRED_KEYS.to_vec(),
            syncs: REQUIRED_SYNCS.to_vec(),
        }
    }

    pub fn axis(&self, axis: EV_ABS) -> Option<AxisRange> {
        self.axes
            .iter()
            .find(|(code, _)| *code == axis)
            .map(|(_, range)| *range)
    }

    /// 检查必需的属性和事件码是否都声明了，坐标轴范围是否合法
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidDescriptor("empty device name".into()));
        }
        for prop in REQUIRED_PROPS {
            if !self.properties.contains(prop) {
                return Err(Error::InvalidDescriptor(format!("missing property {prop:?}")));
            }
        }
        for key in REQUIRED_KEYS {
            if !self.keys.contains(key) {
                return Err(Error::InvalidDescriptor(format!("missing key {key:?}")));
            }
        }
        for sync in REQUIRED_SYNCS {
            if !self.syncs.contains(sync) {
                return Err(Error::InvalidDescriptor(format!("missing sync code {sync:?}")));
            }
        }
        for axis in REQUIRED_AXES {
            match self.axis(*axis) {
                None => {
                    return Err(Error::InvalidDescriptor(format!("missing axis {axis:?}")));
                }
                Some(range) if range.min > range.max => {
                    return Err(Error::InvalidDescriptor(format!(
                        "axis {axis:?} has min {} above max {}",
                        range.min, range.max
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// 所有需要启用的事件码，坐标轴附带范围
    pub fn event_codes(&self) -> Vec<(EventCode, Option<AxisRange>)> {
        let keys = self.keys.iter().map(|key| (EventCode::EV_KEY(*key), None));
        let axes = self
            .axes
            .iter()
            .map(|(axis, range)| (EventCode::EV_ABS(*axis), Some(*range)));
        let syncs = self.syncs.iter().map(|sync| (EventCode::EV_SYN(*sync), None));
        keys.chain(axes).chain(syncs).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_declares_the_full_tablet_set() {
        let descriptor = CapabilityDescriptor::build();
        assert_eq!(descriptor.name, "Tablet alone");
        assert!(descriptor.properties.contains(&InputProp::INPUT_PROP_DIRECT));
        for key in REQUIRED_KEYS {
            assert!(descriptor.keys.contains(key));
        }
        assert!(descriptor.syncs.contains(&EV_SYN::SYN_REPORT));
        assert!(descriptor.syncs.contains(&EV_SYN::SYN_DROPPED));
        assert!(descriptor.validate().is_ok());
    }

    #[test]
    fn build_is_deterministic() {
        assert_eq!(CapabilityDescriptor::build(), CapabilityDescriptor::build());
    }

    #[test]
    fn default_axis_ranges() {
        let descriptor = CapabilityDescriptor::build();
        for axis in [EV_ABS::ABS_X, EV_ABS::ABS_Y] {
            let range = descriptor.axis(axis).unwrap();
            assert_eq!((range.min, range.max, range.resolution), (0, 32767, 100));
        }
        let pressure = descriptor.axis(EV_ABS::ABS_PRESSURE).unwrap();
        assert_eq!((pressure.min, pressure.max, pressure.resolution), (0, 8191, 0));
    }

    #[test]
    fn from_config_matches_build_by_default() {
        let descriptor = CapabilityDescriptor::from_config(&Config::default()).unwrap();
        assert_eq!(descriptor, CapabilityDescriptor::build());
    }

    #[test]
    fn validate_rejects_missing_codes() {
        let mut descriptor = CapabilityDescriptor::build();
        descriptor.keys.retain(|key| *key != EV_KEY::BTN_TOOL_RUBBER);
        assert!(matches!(descriptor.validate(), Err(Error::InvalidDescriptor(_))));

        let mut descriptor = CapabilityDescriptor::build();
        descriptor.syncs.retain(|sync| *sync != EV_SYN::SYN_DROPPED);
        assert!(descriptor.validate().is_err());

        let mut descriptor = CapabilityDescriptor::build();
        descriptor.properties.clear();
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_axis() {
        let mut config = Config::default();
        config.axes.pressure = AxisRange {
            min: 10,
            max: 0,
            ..AxisRange::PRESSURE
        };
        assert!(CapabilityDescriptor::from_config(&config).is_err());
    }

    #[test]
    fn event_codes_carry_ranges_only_for_axes() {
        let codes = CapabilityDescriptor::build().event_codes();
        assert_eq!(codes.len(), 10);
        let pressure = codes
            .iter()
            .find(|(code, _)| *code == EventCode::EV_ABS(EV_ABS::ABS_PRESSURE))
            .unwrap();
        assert_eq!(pressure.1, Some(AxisRange::PRESSURE));
        assert!(
            codes
                .iter()
                .filter(|(code, _)| matches!(code, EventCode::EV_KEY(_)))
                .all(|(_, range)| range.is_none())
        );
    }
}
