//! Startup checks for the reference tables and clock

use super::date::latest_activation_floor;
use crate::clock::Clock;
use crate::error::EpidError;
use crate::types::{HostOsProfile, KeyConfig, HOST_OS_PROFILES, KEY_CONFIGS, LICENSE_CHANNEL};
use chrono::NaiveTime;

/// Largest key id whose major part still fits in three digits
pub const MAX_KEY_ID: u32 = 999_999_999;

/// Check that every table entry renders without overflowing its field.
pub fn validate_tables() -> Result<(), EpidError> {
    validate_host_profiles(HOST_OS_PROFILES)?;
    validate_key_configs(KEY_CONFIGS)?;
    check_width("license channel", LICENSE_CHANNEL, 2)
}

pub fn validate_host_profiles(profiles: &[HostOsProfile]) -> Result<(), EpidError> {
    if profiles.is_empty() {
        return Err(EpidError::EmptyHostTable);
    }
    for profile in profiles {
        check_width("host OS type", profile.type_code, 5)?;
        check_width("host OS build", profile.os_build, 4)?;
    }
    Ok(())
}

pub fn validate_key_configs(configs: &[KeyConfig]) -> Result<(), EpidError> {
    for config in configs {
        if config.pid_range_min > config.pid_range_max {
            return Err(EpidError::InvertedKeyRange {
                name: config.name,
                min: config.pid_range_min,
                max: config.pid_range_max,
            });
        }
        if config.pid_range_max > MAX_KEY_ID {
            return Err(EpidError::KeyRangeOverflow {
                name: config.name,
                max: config.pid_range_max,
            });
        }
        check_width("group id", config.group_id, 5)?;
    }
    Ok(())
}

/// Reject a clock that reads earlier than the newest activation floor.
pub fn validate_clock<C: Clock + ?Sized>(clock: &C) -> Result<(), EpidError> {
    let floor = latest_activation_floor();
    let now = clock.now();
    if floor.and_time(NaiveTime::MIN) > now {
        return Err(EpidError::FloorAfterNow { floor, now });
    }
    Ok(())
}

fn check_width(field: &'static str, value: u32, width: usize) -> Result<(), EpidError> {
    if value >= 10u32.pow(width as u32) {
        return Err(EpidError::FieldOverflow { field, value, width });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::types::{HostOs, KEY_CONFIG_WINDOWS};
    use chrono::NaiveDate;

    #[test]
    fn test_builtin_tables_are_valid() {
        assert_eq!(validate_tables(), Ok(()));
    }

    #[test]
    fn test_inverted_range() {
        let config = KeyConfig {
            pid_range_min: 153_000_000,
            ..KEY_CONFIG_WINDOWS
        };
        assert!(matches!(
            validate_key_configs(&[config]),
            Err(EpidError::InvertedKeyRange { name: "windows", .. })
        ));
    }

    #[test]
    fn test_key_range_overflow() {
        let config = KeyConfig {
            pid_range_max: 1_000_000_000,
            ..KEY_CONFIG_WINDOWS
        };
        assert_eq!(
            validate_key_configs(&[config]),
            Err(EpidError::KeyRangeOverflow {
                name: "windows",
                max: 1_000_000_000
            })
        );
    }

    #[test]
    fn test_group_id_overflow() {
        let config = KeyConfig {
            group_id: 100_000,
            ..KEY_CONFIG_WINDOWS
        };
        assert!(matches!(
            validate_key_configs(&[config]),
            Err(EpidError::FieldOverflow { field: "group id", width: 5, .. })
        ));
    }

    #[test]
    fn test_host_build_overflow() {
        let profile = HostOsProfile {
            os_build: 17763,
            ..*HostOs::Server2012R2.profile()
        };
        assert!(matches!(
            validate_host_profiles(&[profile]),
            Err(EpidError::FieldOverflow { field: "host OS build", value: 17763, width: 4 })
        ));
    }

    #[test]
    fn test_empty_host_table() {
        assert_eq!(validate_host_profiles(&[]), Err(EpidError::EmptyHostTable));
    }

    #[test]
    fn test_clock_before_latest_floor() {
        let now = NaiveDate::from_ymd_opt(2013, 10, 16).unwrap().and_hms_opt(12, 0, 0).unwrap();
        assert!(matches!(
            validate_clock(&FixedClock(now)),
            Err(EpidError::FloorAfterNow { .. })
        ));

        let now = NaiveDate::from_ymd_opt(2013, 10, 17).unwrap().and_time(NaiveTime::MIN);
        assert_eq!(validate_clock(&FixedClock(now)), Ok(()));
    }
}
