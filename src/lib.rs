#![deny(unsafe_code)]
#![warn(missing_docs)]

//! A client for the Supermicro BMC web interface.
//!
//! The crate implements:
//! - session login and refresh against `/cgi/login.cgi`
//! - power supply readings (`Get_PSInfoReadings.XML`)
//! - sensor readings (`SENSOR_INFO.XML`), decoded with the IPMI 2.0 sensor
//!   reading conversion formula and linearisation
//!
//! The decoding functions are pure and can be used on their own with records
//! obtained through [`extract_records`]:
//!
//! ```
//! use smbmc::{extract_records, process_sensor_response, SensorType};
//!
//! let xml = r#"<IPMI><SENSOR_INFO>
//!     <SENSOR NAME="12V" ERTYPE="01" STYPE="02" UNIT1="00" UNIT="04" OPTION="c0"
//!             READING="84c000" M="6400" B="0000" RB="d0" L="00"
//!             UNR="a0" UC="9e" UNC="9c" LNC="6a" LC="65" LNR="64"/>
//! </SENSOR_INFO></IPMI>"#;
//!
//! let records = extract_records(xml, "SENSOR")?;
//! let sensors = process_sensor_response(&records)?;
//! assert_eq!(sensors[0].sensor_type, SensorType::Voltage);
//! assert_eq!(sensors[0].reading, 13.2);
//! # Ok::<(), smbmc::Error>(())
//! ```

#[cfg(any(feature = "blocking", feature = "async"))]
mod client;
mod conversion;
#[cfg(any(feature = "blocking", feature = "async"))]
mod debug;
mod error;
mod hex;
#[cfg(any(feature = "blocking", feature = "async"))]
mod observe;
mod pmbus;
mod record;
#[cfg(any(feature = "blocking", feature = "async"))]
mod secret;
mod sensor;
#[cfg(any(feature = "blocking", feature = "async"))]
mod transport;
mod types;

#[cfg(feature = "blocking")]
pub use crate::client::blocking::Client;
#[cfg(any(feature = "blocking", feature = "async"))]
pub use crate::client::core::ClientBuilder;
#[cfg(feature = "async")]
pub use crate::client::tokio::AsyncClient;
pub use crate::conversion::{LinearisationMethod, perform_linearisation, reading_conversion};
pub use crate::error::{Error, Result};
pub use crate::hex::{hex_signed_int, parse_hex, signed_int, ten_bit_str};
pub use crate::pmbus::{process_pmbus_psu, process_pmbus_response};
pub use crate::record::{Record, extract_records};
pub use crate::sensor::{
    get_sensor_state, is_analog_data_format, is_threshold_sensor, process_discrete_sensor,
    process_sensor, process_sensor_response, process_threshold_sensor,
};
pub use crate::types::{
    Metric, Metrics, PowerSupply, PowerSupplyFlags, Sensor, SensorState, SensorType, SensorUnit,
};
