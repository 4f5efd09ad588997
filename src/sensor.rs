//! Decoding of `SENSOR` records from the `SENSOR_INFO.XML` response.

use crate::conversion::{perform_linearisation, reading_conversion};
use crate::error::{Error, Result};
use crate::hex::{hex_digits, hex_signed_int, parse_hex};
use crate::record::Record;
use crate::types::{PowerSupplyFlags, Sensor, SensorState, SensorType, SensorUnit};

/// Event/Reading type code of threshold sensors (SDR type 01h, byte 14).
const EVENT_READING_TYPE_THRESHOLD: i64 = 0x01;

/// Analog data format "2's complement" (UNIT1 bits 7:6).
const ANALOG_FORMAT_TWOS_COMPLEMENT: i64 = 0x02;

/// "Sensor scanning enabled" bit of the OPTION byte.
const OPTION_PRESENT: i64 = 0x40;

/// True when the Event/Reading type code marks a threshold sensor.
pub fn is_threshold_sensor(er_type: &str) -> Result<bool> {
    Ok(parse_hex(er_type)? == EVENT_READING_TYPE_THRESHOLD)
}

/// True when UNIT1 declares readings in two's complement.
pub fn is_analog_data_format(unit_type_1: &str) -> Result<bool> {
    Ok(parse_hex(unit_type_1)? >> 6 == ANALOG_FORMAT_TWOS_COMPLEMENT)
}

/// Presence state from the OPTION byte.
///
/// Only ever yields [`SensorState::Present`] or [`SensorState::NotPresent`].
pub fn get_sensor_state(option: &str) -> Result<SensorState> {
    Ok(if parse_hex(option)? & OPTION_PRESENT != 0 {
        SensorState::Present
    } else {
        SensorState::NotPresent
    })
}

/// Decode a threshold sensor: reading and all six thresholds.
pub fn process_threshold_sensor(item: &Record) -> Result<Sensor> {
    // Reading (first byte only) followed by UNR, UC, UNC, LNC, LC, LNR.
    let mut values: [String; 7] = [
        hex_digits(item.field("READING")?, 0, 2),
        item.field("UNR")?,
        item.field("UC")?,
        item.field("UNC")?,
        item.field("LNC")?,
        item.field("LC")?,
        item.field("LNR")?,
    ]
    .map(str::to_owned);

    let multiplier = item.field("M")?;
    let offset = item.field("B")?;
    let rb_exponent = item.field("RB")?;
    let l_method = item.field("L")?;

    if is_analog_data_format(item.field("UNIT1")?)? {
        for value in values.iter_mut() {
            *value = hex_signed_int(value, 8)?;
        }
    }

    let mut converted = [0f64; 7];
    for (out, value) in converted.iter_mut().zip(&values) {
        let raw = reading_conversion(value, multiplier, offset, rb_exponent)?;
        *out = perform_linearisation(l_method, raw)?;
    }
    let [reading, unr, uc, unc, lnc, lc, lnr] = converted;

    Ok(Sensor {
        name: item.field("NAME")?.to_owned(),
        sensor_type: SensorType::from_code(parse_hex(item.field("STYPE")?)?)?,
        unit: SensorUnit::from_code(parse_hex(item.field("UNIT")?)?)?,
        state: get_sensor_state(item.field("OPTION")?)?,
        reading,
        unr,
        uc,
        unc,
        lnc,
        lc,
        lnr,
        ..Sensor::default()
    })
}

/// Decode a discrete sensor.
///
/// Returns `Ok(None)` when the sensor is not present. Only power supply
/// sensors are decoded; other present discrete types fail with
/// [`Error::UnimplementedDiscreteType`].
pub fn process_discrete_sensor(item: &Record) -> Result<Option<Sensor>> {
    let stype = parse_hex(item.field("STYPE")?)?;
    let state = get_sensor_state(item.field("OPTION")?)?;

    if state == SensorState::NotPresent {
        return Ok(None);
    }

    let reading = item.field("READING")?;
    let sensor_data = parse_hex(hex_digits(reading, 2, 4))?;
    let sensor_data =
        u8::try_from(sensor_data).map_err(|_| Error::OutOfRange(reading.to_owned()))?;

    if stype != i64::from(SensorType::PowerSupply.as_u8()) {
        return Err(Error::UnimplementedDiscreteType(stype));
    }

    Ok(Some(Sensor {
        name: item.field("NAME")?.to_owned(),
        sensor_type: SensorType::PowerSupply,
        state,
        flags: Some(PowerSupplyFlags::from_bits(sensor_data)),
        ..Sensor::default()
    }))
}

/// Decode one record, dispatching on its Event/Reading type.
pub fn process_sensor(item: &Record) -> Result<Option<Sensor>> {
    if is_threshold_sensor(item.field("ERTYPE")?)? {
        process_threshold_sensor(item).map(Some)
    } else {
        process_discrete_sensor(item)
    }
}

/// Decode every `SENSOR` record in order.
///
/// Sensors that are not present are skipped; ids are assigned to the
/// remaining sensors in order, starting at zero. The first failing record
/// fails the whole response.
pub fn process_sensor_response(items: &[Record]) -> Result<Vec<Sensor>> {
    let mut sensors = Vec::with_capacity(items.len());
    for item in items {
        if let Some(mut sensor) = process_sensor(item)? {
            sensor.id = sensors.len();
            sensors.push(sensor);
        }
    }
    Ok(sensors)
}
