//! Built-in channel tables for each PAPR firmware build.
//!
//! Both builds share the environmental feeds. The data build adds the
//! battery, fan and startup sequencing feeds on top.

use crate::channel::{ChannelKind, ChannelSpec};

use ChannelKind::*;

/// Feeds present on every build, in firmware declaration order.
const ENVIRONMENT: [ChannelSpec; 13] = [
    ChannelSpec::new("temperature_1", "papr/temperature/1/", Temperature),
    ChannelSpec::new("humidity_1", "papr/humidity/1/", Humidity),
    ChannelSpec::new("pressure_1", "papr/pressure/1/", Pressure),
    ChannelSpec::new("pressure_2", "papr/pressure/2/", Pressure),
    ChannelSpec::new("pressure_3", "papr/pressure/3/", Pressure),
    ChannelSpec::new("temperature_2", "papr/temperature/2/", Temperature),
    ChannelSpec::new("humidity_2", "papr/humidity/2/", Humidity),
    ChannelSpec::new("temperature_3", "papr/temperature/3/", Temperature),
    ChannelSpec::new("humidity_3", "papr/humidity/3/", Humidity),
    ChannelSpec::new("temperature_4", "papr/temperature/4/", Temperature),
    ChannelSpec::new("humidity_4", "papr/humidity/4/", Humidity),
    ChannelSpec::new("temperature_5", "papr/temperature/5/", Temperature),
    ChannelSpec::new("humidity_5", "papr/humidity/5/", Humidity),
];

const DEVICE: [ChannelSpec; 5] = [
    ChannelSpec::new("battery_1", "papr/battery/1/", Battery),
    ChannelSpec::new("fan_speed_1", "papr/fanspeed/1/", FanSpeed),
    ChannelSpec::new("startup_p1", "papr/startup/p1/", StartupEvent),
    ChannelSpec::new("startup_p2", "papr/startup/p2/", StartupEvent),
    ChannelSpec::new("startup_p3", "papr/startup/p3/", StartupEvent),
];

const fn concat<const A: usize, const B: usize, const N: usize>(
    a: [ChannelSpec; A],
    b: [ChannelSpec; B],
) -> [ChannelSpec; N] {
    assert!(A + B == N);
    let mut out = [a[0]; N];
    let mut i = 0;
    while i < A {
        out[i] = a[i];
        i += 1;
    }
    while i < N {
        out[i] = b[i - A];
        i += 1;
    }
    out
}

const DATA: [ChannelSpec; 18] = concat(ENVIRONMENT, DEVICE);

/// Feeds of the `papr-data` build: environment plus battery, fan and startup.
pub const DATA_CHANNELS: &[ChannelSpec] = &DATA;
/// Feeds of the `papr-mqtt` build: environment only.
pub const MQTT_CHANNELS: &[ChannelSpec] = &ENVIRONMENT;

/// The firmware build a registry is populated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceVariant {
    /// The `papr-data` build: environmental feeds plus battery, fan speed and
    /// startup sequencing.
    Data,
    /// The `papr-mqtt` build: temperature, humidity and pressure only.
    Mqtt,
}

impl DeviceVariant {
    /// The channel table of this build, in declaration order.
    pub const fn channels(self) -> &'static [ChannelSpec] {
        match self {
            DeviceVariant::Data => DATA_CHANNELS,
            DeviceVariant::Mqtt => MQTT_CHANNELS,
        }
    }

    /// The firmware build name.
    pub const fn name(self) -> &'static str {
        match self {
            DeviceVariant::Data => "papr-data",
            DeviceVariant::Mqtt => "papr-mqtt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(variant: DeviceVariant) -> std::vec::Vec<&'static str> {
        variant.channels().iter().map(|spec| spec.topic).collect()
    }

    fn assert_unique(specs: &[ChannelSpec]) {
        for (i, a) in specs.iter().enumerate() {
            for b in &specs[i + 1..] {
                assert_ne!(a.id, b.id);
                assert_ne!(a.topic, b.topic);
            }
        }
    }

    #[test]
    fn tables_have_unique_ids_and_topics() {
        assert_unique(DeviceVariant::Data.channels());
        assert_unique(DeviceVariant::Mqtt.channels());
    }

    #[test]
    fn topics_follow_papr_layout() {
        for spec in DeviceVariant::Data.channels() {
            let expected_prefix = ["papr/", spec.kind.segment(), "/"].concat();
            assert!(spec.topic.starts_with(&expected_prefix), "{}", spec.topic);
            assert!(spec.topic.ends_with('/'));
            assert_eq!(spec.topic, spec.topic.to_lowercase());
        }
    }

    #[test]
    fn data_build_publishes_every_feed_in_order() {
        assert_eq!(DeviceVariant::Data.name(), "papr-data");
        assert_eq!(
            topics(DeviceVariant::Data),
            [
                "papr/temperature/1/",
                "papr/humidity/1/",
                "papr/pressure/1/",
                "papr/pressure/2/",
                "papr/pressure/3/",
                "papr/temperature/2/",
                "papr/humidity/2/",
                "papr/temperature/3/",
                "papr/humidity/3/",
                "papr/temperature/4/",
                "papr/humidity/4/",
                "papr/temperature/5/",
                "papr/humidity/5/",
                "papr/battery/1/",
                "papr/fanspeed/1/",
                "papr/startup/p1/",
                "papr/startup/p2/",
                "papr/startup/p3/",
            ]
        );
    }

    #[test]
    fn mqtt_build_publishes_environment_only() {
        assert_eq!(DeviceVariant::Mqtt.name(), "papr-mqtt");
        assert_eq!(
            topics(DeviceVariant::Mqtt),
            [
                "papr/temperature/1/",
                "papr/humidity/1/",
                "papr/pressure/1/",
                "papr/pressure/2/",
                "papr/pressure/3/",
                "papr/temperature/2/",
                "papr/humidity/2/",
                "papr/temperature/3/",
                "papr/humidity/3/",
                "papr/temperature/4/",
                "papr/humidity/4/",
                "papr/temperature/5/",
                "papr/humidity/5/",
            ]
        );
    }

    #[test]
    fn data_build_extends_mqtt_build() {
        let mqtt = DeviceVariant::Mqtt.channels();
        let data = DeviceVariant::Data.channels();
        assert_eq!(&data[..mqtt.len()], mqtt);
        assert_eq!(data[14].id, "fan_speed_1");
        assert_eq!(data[17].id, "startup_p3");
    }
}
