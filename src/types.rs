use core::fmt;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::{Error, Result};

/// Presence state of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[repr(u8)]
pub enum SensorState {
    /// State was not reported.
    #[default]
    Unspecified = 0,
    /// Sensor is present.
    Present = 1,
    /// Sensor is not present.
    NotPresent = 2,
}

/// Unit of a sensor reading (IPMI sensor unit type codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[repr(u8)]
pub enum SensorUnit {
    /// No unit.
    #[default]
    Unspecified = 0,
    /// Degrees Celsius.
    DegreesCelsius = 1,
    /// Volts.
    Volts = 4,
    /// Amps.
    Amps = 5,
    /// Watts.
    Watts = 6,
    /// Revolutions per minute.
    Rpm = 18,
}

/// Type of a sensor (IPMI sensor type codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[repr(u8)]
pub enum SensorType {
    /// Type was not reported.
    #[default]
    Unspecified = 0x00,
    /// Temperature sensor.
    Temperature = 0x01,
    /// Voltage sensor.
    Voltage = 0x02,
    /// Fan sensor.
    Fan = 0x04,
    /// Power supply sensor.
    PowerSupply = 0x08,
}

macro_rules! wire_code {
    ($ty:ident, $kind:literal, { $($code:literal => $variant:ident),+ $(,)? }) => {
        impl $ty {
            /// Raw wire code.
            pub fn as_u8(self) -> u8 {
                self as u8
            }

            /// Look up the variant for a wire code.
            pub fn from_code(code: i64) -> Result<Self> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    other => Err(Error::UnknownCode { kind: $kind, code: other }),
                }
            }
        }

        impl TryFrom<u8> for $ty {
            type Error = Error;

            fn try_from(code: u8) -> Result<Self> {
                Self::from_code(i64::from(code))
            }
        }
    };
}

wire_code!(SensorState, "sensor state", { 0 => Unspecified, 1 => Present, 2 => NotPresent });
wire_code!(SensorUnit, "sensor unit", {
    0 => Unspecified,
    1 => DegreesCelsius,
    4 => Volts,
    5 => Amps,
    6 => Watts,
    18 => Rpm,
});
wire_code!(SensorType, "sensor type", {
    0x00 => Unspecified,
    0x01 => Temperature,
    0x02 => Voltage,
    0x04 => Fan,
    0x08 => PowerSupply,
});

impl fmt::Display for SensorUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unspecified => "",
            Self::DegreesCelsius => "°C",
            Self::Volts => "V",
            Self::Amps => "A",
            Self::Watts => "W",
            Self::Rpm => "rpm",
        })
    }
}

/// Power supply discrete state offsets (IPMI sensor type 08h).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PowerSupplyFlags(u8);

impl PowerSupplyFlags {
    /// No state asserted.
    pub const UNSPECIFIED: Self = Self(0x00);
    /// Presence detected.
    pub const PRESENCE_DETECTED: Self = Self(0x01);
    /// Power supply failure detected.
    pub const FAILURE: Self = Self(0x02);
    /// Predictive failure.
    pub const PREDICTIVE_FAILURE: Self = Self(0x04);
    /// Power supply input lost (AC/DC).
    pub const SOURCE_INPUT_LOST: Self = Self(0x08);
    /// Power supply input lost or out of range.
    pub const SOURCE_INPUT_OUT_OF_RANGE: Self = Self(0x10);
    /// Power supply input out of range, but present.
    pub const SOURCE_INPUT_DETECTED_OUT_OF_RANGE: Self = Self(0x20);
    /// Configuration error.
    pub const CONFIGURATION_ERROR: Self = Self(0x40);
    /// Power supply inactive (standby).
    pub const STANDBY: Self = Self(0x80);

    const NAMES: [(Self, &'static str); 8] = [
        (Self::PRESENCE_DETECTED, "PRESENCE_DETECTED"),
        (Self::FAILURE, "FAILURE"),
        (Self::PREDICTIVE_FAILURE, "PREDICTIVE_FAILURE"),
        (Self::SOURCE_INPUT_LOST, "SOURCE_INPUT_LOST"),
        (Self::SOURCE_INPUT_OUT_OF_RANGE, "SOURCE_INPUT_OUT_OF_RANGE"),
        (
            Self::SOURCE_INPUT_DETECTED_OUT_OF_RANGE,
            "SOURCE_INPUT_DETECTED_OUT_OF_RANGE",
        ),
        (Self::CONFIGURATION_ERROR, "CONFIGURATION_ERROR"),
        (Self::STANDBY, "STANDBY"),
    ];

    /// Build a flag set from the raw sensor-specific state byte.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw state byte.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True when no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every flag in `other` is also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when `self` and `other` share at least one flag.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Iterate over the names of the set flags, lowest bit first.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl fmt::Debug for PowerSupplyFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("PowerSupplyFlags(UNSPECIFIED)");
        }
        f.write_str("PowerSupplyFlags(")?;
        for (i, name) in self.names().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
        }
        f.write_str(")")
    }
}

impl From<u8> for PowerSupplyFlags {
    fn from(bits: u8) -> Self {
        Self(bits)
    }
}

impl BitOr for PowerSupplyFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PowerSupplyFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for PowerSupplyFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for PowerSupplyFlags {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

/// A decoded sensor from the `SENSOR_INFO.XML` response.
///
/// Threshold sensors carry a reading and six thresholds; discrete sensors
/// leave them at zero. `flags` is only set for discrete power supply sensors.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Sensor {
    /// Position in the decoded list.
    pub id: usize,
    /// Sensor name.
    pub name: String,
    /// Sensor type.
    pub sensor_type: SensorType,
    /// Unit of the reading and thresholds.
    pub unit: SensorUnit,
    /// Presence state.
    pub state: SensorState,
    /// Power supply state flags (discrete power supply sensors only).
    pub flags: Option<PowerSupplyFlags>,
    /// Current reading.
    pub reading: f64,
    /// Lower non-recoverable threshold.
    pub lnr: f64,
    /// Lower critical threshold.
    pub lc: f64,
    /// Lower non-critical threshold.
    pub lnc: f64,
    /// Upper non-critical threshold.
    pub unc: f64,
    /// Upper critical threshold.
    pub uc: f64,
    /// Upper non-recoverable threshold.
    pub unr: f64,
}

/// A power supply unit from the `Get_PSInfoReadings.XML` response.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PowerSupply {
    /// Slot position in the decoded list.
    pub id: usize,
    /// Serial number; empty for unpopulated slots.
    pub name: String,
    /// Raw status code (likely the I2C status).
    pub status: String,
    /// Raw type code (likely the power state).
    pub ps_type: String,
    /// Input voltage (V AC).
    pub input_voltage: u64,
    /// Input current (A).
    pub input_current: f64,
    /// Input power (W).
    pub input_power: u64,
    /// Output voltage (V DC).
    pub output_voltage: f64,
    /// Output current (A).
    pub output_current: f64,
    /// Output power (W).
    pub output_power: u64,
    /// First temperature, likely intake (°C).
    pub temp_1: u64,
    /// Second temperature, likely outlet (°C).
    pub temp_2: u64,
    /// First fan speed (rpm).
    pub fan_1: u64,
    /// Second fan speed (rpm).
    pub fan_2: u64,
}

/// A metric category that can be requested from the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Metric {
    /// Power supply readings (`Get_PSInfoReadings.XML`).
    Pmbus,
    /// Sensor readings (`SENSOR_INFO.XML`).
    Sensor,
}

impl Metric {
    /// Every known metric, in default fetch order.
    pub const ALL: [Metric; 2] = [Metric::Pmbus, Metric::Sensor];

    /// Name used for the metric category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pmbus => "pmbus",
            Self::Sensor => "sensor",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.as_str() == s)
            .ok_or_else(|| Error::InvalidMetric(s.to_owned()))
    }
}

/// Metrics fetched by a single `get_metrics` call, keyed by category.
///
/// Categories that were not requested are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Metrics {
    /// Power supplies, when `pmbus` was requested.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub pmbus: Option<Vec<PowerSupply>>,
    /// Sensors, when `sensor` was requested.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub sensor: Option<Vec<Sensor>>,
}

impl Metrics {
    /// Categories present in this result.
    pub fn categories(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|metric| match metric {
                Metric::Pmbus => self.pmbus.is_some(),
                Metric::Sensor => self.sensor.is_some(),
            })
            .collect()
    }
}
