//! Decoding of `PSItem` records from the `Get_PSInfoReadings.XML` response.

use crate::error::{Error, Result};
use crate::hex::parse_hex;
use crate::record::Record;
use crate::types::PowerSupply;

fn hex_u64(item: &Record, name: &str) -> Result<u64> {
    let value = item.field(name)?;
    u64::try_from(parse_hex(value)?).map_err(|_| Error::OutOfRange(value.to_owned()))
}

fn hex_scaled(item: &Record, name: &str, divisor: f64) -> Result<f64> {
    Ok(hex_u64(item, name)? as f64 / divisor)
}

/// Decode a single power supply. The id is left at zero.
pub fn process_pmbus_psu(item: &Record) -> Result<PowerSupply> {
    Ok(PowerSupply {
        id: 0,
        name: item.field("name")?.to_owned(),
        status: item.field("a_b_PS_Status_I2C")?.to_owned(),
        ps_type: item.field("psType")?.to_owned(),
        input_voltage: hex_u64(item, "acInVoltage")?,
        input_current: hex_scaled(item, "acInCurrent", 1000.0)?,
        input_power: hex_u64(item, "acInPower")?,
        output_voltage: hex_scaled(item, "dc12OutVoltage", 10.0)?,
        output_current: hex_scaled(item, "dc12OutCurrent", 1000.0)?,
        output_power: hex_u64(item, "dcOutPower")?,
        temp_1: hex_u64(item, "temp1")?,
        temp_2: hex_u64(item, "temp2")?,
        fan_1: hex_u64(item, "fan1")?,
        fan_2: hex_u64(item, "fan2")?,
    })
}

/// Decode every `PSItem` record, numbering them by position.
pub fn process_pmbus_response(items: &[Record]) -> Result<Vec<PowerSupply>> {
    items
        .iter()
        .enumerate()
        .map(|(id, item)| {
            let mut psu = process_pmbus_psu(item)?;
            psu.id = id;
            Ok(psu)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> Record {
        Record::new()
            .with("name", "PSU0SERIAL0NO00")
            .with("a_b_PS_Status_I2C", "1")
            .with("psType", "1")
            .with("acInVoltage", "ef")
            .with("acInCurrent", "167")
            .with("acInPower", "54")
            .with("dc12OutVoltage", "79")
            .with("dc12OutCurrent", "1676")
            .with("dcOutPower", "45")
            .with("temp1", "28")
            .with("temp2", "37")
            .with("fan1", "b4e")
            .with("fan2", "f07")
    }

    fn empty_slot() -> Record {
        [
            "acInVoltage",
            "acInCurrent",
            "acInPower",
            "dc12OutVoltage",
            "dc12OutCurrent",
            "dcOutPower",
            "temp1",
            "temp2",
            "fan1",
            "fan2",
        ]
        .into_iter()
        .map(|name| (name, "0000"))
        .collect::<Record>()
        .with("name", "")
        .with("a_b_PS_Status_I2C", "ff")
        .with("psType", "0")
    }

    #[test]
    fn populated_supply_is_scaled() {
        let psu = process_pmbus_psu(&populated()).expect("decode");
        assert_eq!(psu.name, "PSU0SERIAL0NO00");
        assert_eq!(psu.status, "1");
        assert_eq!(psu.ps_type, "1");
        assert_eq!(psu.input_voltage, 239);
        assert_eq!(psu.input_current, 0.359);
        assert_eq!(psu.input_power, 84);
        assert_eq!(psu.output_voltage, 12.1);
        assert_eq!(psu.output_current, 5.75);
        assert_eq!(psu.output_power, 69);
        assert_eq!(psu.temp_1, 40);
        assert_eq!(psu.temp_2, 55);
        assert_eq!(psu.fan_1, 2894);
        assert_eq!(psu.fan_2, 3847);
    }

    #[test]
    fn empty_slot_decodes_to_zero() {
        let psu = process_pmbus_psu(&empty_slot()).expect("decode");
        assert_eq!(psu.name, "");
        assert_eq!(psu.status, "ff");
        assert_eq!(psu.ps_type, "0");
        assert_eq!(psu.input_voltage, 0);
        assert_eq!(psu.input_current, 0.0);
        assert_eq!(psu.output_voltage, 0.0);
        assert_eq!(psu.fan_2, 0);
    }

    #[test]
    fn wide_fields_are_kept() {
        let psu = process_pmbus_psu(&populated().with("acInVoltage", "100000000")).expect("decode");
        assert_eq!(psu.input_voltage, 0x1_0000_0000);
    }

    #[test]
    fn ids_follow_position() {
        let items = vec![empty_slot(), populated(), empty_slot()];
        let psus = process_pmbus_response(&items).expect("decode");
        let ids: Vec<_> = psus.iter().map(|psu| psu.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(psus[1].name, "PSU0SERIAL0NO00");
    }

    #[test]
    fn malformed_field_fails_the_response() {
        let items = vec![populated(), populated().with("temp1", "hot")];
        assert!(matches!(
            process_pmbus_response(&items),
            Err(Error::MalformedField(value)) if value == "hot"
        ));

        let negative = populated().with("fan1", "-1");
        assert!(matches!(
            process_pmbus_psu(&negative),
            Err(Error::OutOfRange(value)) if value == "-1"
        ));

        let missing = Record::new().with("name", "").with("psType", "0");
        assert!(matches!(
            process_pmbus_psu(&missing),
            Err(Error::MissingField(name)) if name == "a_b_PS_Status_I2C"
        ));
    }
}
