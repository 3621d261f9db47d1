//! Settings Model (计费参数 + 历史版本)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum accepted price per cubic meter
pub const MAX_CHARGE_PER_CUBIC_METER: f64 = 1_000_000.0;

/// Closed set of versioned billing settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum SettingKey {
    /// Price per cubic meter, in [0, MAX_CHARGE_PER_CUBIC_METER]
    #[serde(alias = "chargePerCubicMeter")]
    ChargePerCubicMeter,
    /// Late surcharge as a fraction in [0, 1]
    #[serde(alias = "surchargeRate")]
    SurchargeRate,
}

impl SettingKey {
    pub const ALL: [SettingKey; 2] = [SettingKey::ChargePerCubicMeter, SettingKey::SurchargeRate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChargePerCubicMeter => "charge_per_cubic_meter",
            Self::SurchargeRate => "surcharge_rate",
        }
    }

    /// Read this key's value out of the current settings row
    pub fn read(&self, settings: &Settings) -> f64 {
        match self {
            Self::ChargePerCubicMeter => settings.charge_per_cubic_meter,
            Self::SurchargeRate => settings.surcharge_rate,
        }
    }

    /// Write this key's value into a settings row
    pub fn write(&self, settings: &mut Settings, value: f64) {
        match self {
            Self::ChargePerCubicMeter => settings.charge_per_cubic_meter = value,
            Self::SurchargeRate => settings.surcharge_rate = value,
        }
    }

    /// Range check for a candidate value of this key
    pub fn validate(&self, value: f64) -> Result<(), String> {
        if !value.is_finite() {
            return Err(format!("{self} must be a finite number, got {value}"));
        }
        match self {
            Self::ChargePerCubicMeter if value < 0.0 => {
                Err(format!("{self} must be non-negative, got {value}"))
            }
            Self::ChargePerCubicMeter if value > MAX_CHARGE_PER_CUBIC_METER => Err(format!(
                "{self} exceeds maximum allowed ({MAX_CHARGE_PER_CUBIC_METER}), got {value}"
            )),
            Self::SurchargeRate if !(0.0..=1.0).contains(&value) => {
                Err(format!("{self} must be between 0 and 1, got {value}"))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "charge_per_cubic_meter" | "chargePerCubicMeter" => Ok(Self::ChargePerCubicMeter),
            "surcharge_rate" | "surchargeRate" => Ok(Self::SurchargeRate),
            other => Err(format!(
                "unknown settings key '{other}', expected charge_per_cubic_meter or surcharge_rate"
            )),
        }
    }
}

/// Current settings (singleton row)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Settings {
    pub charge_per_cubic_meter: f64,
    pub surcharge_rate: f64,
    pub updated_at: i64,
}

/// One append-only history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SettingHistoryEntry {
    pub id: i64,
    pub setting_key: SettingKey,
    pub value: f64,
    /// Unix millis from which `value` applies
    pub effective_from: i64,
}

/// Update settings payload
///
/// `key` stays a string so an unknown key is reported as a validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub key: String,
    pub value: f64,
}

/// Rate in effect at the first instant of one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRate {
    /// `YYYY-MM`
    pub month: String,
    /// First instant of the month (Unix millis, UTC)
    pub month_start: i64,
    /// `None` when no rate had been recorded yet
    pub value: Option<f64>,
}

/// Rate lookup result for a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveRate {
    pub key: SettingKey,
    pub at: i64,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse_accepts_both_spellings() {
        assert_eq!(
            "chargePerCubicMeter".parse::<SettingKey>(),
            Ok(SettingKey::ChargePerCubicMeter)
        );
        assert_eq!(
            "surcharge_rate".parse::<SettingKey>(),
            Ok(SettingKey::SurchargeRate)
        );
        assert!("lateFee".parse::<SettingKey>().is_err());
    }

    #[test]
    fn test_charge_validator() {
        let key = SettingKey::ChargePerCubicMeter;
        assert!(key.validate(0.0).is_ok());
        assert!(key.validate(1500.25).is_ok());
        assert!(key.validate(-0.01).is_err());
        assert!(key.validate(f64::NAN).is_err());
        assert!(key.validate(MAX_CHARGE_PER_CUBIC_METER).is_ok());
        assert!(key.validate(1e20).is_err());
    }

    #[test]
    fn test_surcharge_validator() {
        let key = SettingKey::SurchargeRate;
        assert!(key.validate(0.0).is_ok());
        assert!(key.validate(0.05).is_ok());
        assert!(key.validate(1.0).is_ok());
        assert!(key.validate(1.01).is_err());
        assert!(key.validate(-0.5).is_err());
    }

    #[test]
    fn test_read_write_roundtrip() {
        let mut settings = Settings::default();
        SettingKey::SurchargeRate.write(&mut settings, 0.1);
        assert_eq!(SettingKey::SurchargeRate.read(&settings), 0.1);
        assert_eq!(SettingKey::ChargePerCubicMeter.read(&settings), 0.0);
    }
}
