//! Activation date selection

use crate::error::EpidError;
use crate::types::{
    ApplicationId, HostOs, HostOsProfile, HOST_OS_PROFILES, HOST_SERVER2008R2, HOST_SERVER2012,
    HOST_SERVER2012R2, OFFICE15_RELEASE,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;

/// Earliest plausible activation date for a request served by `host`.
///
/// Newer products win: a 2012 R2 host or protocol 6 pins the floor to the
/// 2012 R2 release, then Office 2013, then a 2012 host or protocol 5, and
/// finally the 2008 R2 SP1 baseline.
pub fn activation_floor(app: ApplicationId, protocol: u32, host: &HostOsProfile) -> NaiveDate {
    if host.host == HostOs::Server2012R2 || protocol == 6 {
        HOST_SERVER2012R2.release
    } else if app == ApplicationId::Office15 {
        OFFICE15_RELEASE
    } else if host.host == HostOs::Server2012 || protocol == 5 {
        HOST_SERVER2012.release
    } else {
        HOST_SERVER2008R2.release
    }
}

/// The newest floor any request can produce.
pub fn latest_activation_floor() -> NaiveDate {
    HOST_OS_PROFILES
        .iter()
        .map(|profile| profile.release)
        .chain(std::iter::once(OFFICE15_RELEASE))
        .max()
        .unwrap_or(HOST_SERVER2012R2.release)
}

/// Pick an activation date between midnight of `floor` and `now`, both inclusive.
///
/// The instant is drawn uniformly over seconds and then truncated to its
/// calendar date, so a partial last day is weighted by how much of it has
/// elapsed.
pub fn random_activation_date<R: Rng + ?Sized>(
    rng: &mut R,
    floor: NaiveDate,
    now: NaiveDateTime,
) -> Result<NaiveDate, EpidError> {
    let start = floor.and_time(NaiveTime::MIN);
    if start > now {
        return Err(EpidError::FloorAfterNow { floor, now });
    }

    let span = (now - start).num_seconds();
    let offset = rng.gen_range(0..=span);
    Ok((start + Duration::seconds(offset)).date())
}

/// 1-based day number within the date's year.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_floor_priority() {
        let cases = [
            (ApplicationId::Windows, 4, &HOST_SERVER2008R2, date(2011, 2, 16)),
            (ApplicationId::Windows, 5, &HOST_SERVER2008R2, date(2012, 9, 4)),
            (ApplicationId::Windows, 4, &HOST_SERVER2012, date(2012, 9, 4)),
            (ApplicationId::Office14, 4, &HOST_SERVER2012R2, date(2013, 10, 17)),
            (ApplicationId::Office14, 6, &HOST_SERVER2008R2, date(2013, 10, 17)),
            (ApplicationId::Office15, 4, &HOST_SERVER2008R2, date(2012, 10, 24)),
            (ApplicationId::Office15, 5, &HOST_SERVER2012, date(2012, 10, 24)),
            (ApplicationId::Office15, 4, &HOST_SERVER2012R2, date(2013, 10, 17)),
        ];

        for (app, protocol, host, expected) in cases {
            assert_eq!(
                activation_floor(app, protocol, host),
                expected,
                "{app} protocol {protocol} on {}",
                host.description
            );
        }
    }

    #[test]
    fn test_protocol_6_floor_ignores_host() {
        for app in ApplicationId::ALL {
            for host in HOST_OS_PROFILES {
                assert_eq!(activation_floor(app, 6, host), date(2013, 10, 17));
            }
        }
    }

    #[test]
    fn test_latest_floor() {
        assert_eq!(latest_activation_floor(), date(2013, 10, 17));
    }

    #[test]
    fn test_random_date_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let floor = date(2012, 9, 4);
        let now = date(2021, 6, 30).and_hms_opt(8, 15, 0).unwrap();

        for _ in 0..1000 {
            let drawn = random_activation_date(&mut rng, floor, now).unwrap();
            assert!(drawn >= floor && drawn <= now.date(), "{drawn} outside range");
        }
    }

    #[test]
    fn test_random_date_at_floor_instant() {
        let mut rng = StdRng::seed_from_u64(1);
        let floor = date(2013, 10, 17);
        let now = floor.and_time(NaiveTime::MIN);
        assert_eq!(random_activation_date(&mut rng, floor, now).unwrap(), floor);
    }

    #[test]
    fn test_floor_after_now_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let floor = date(2013, 10, 17);
        let now = date(2013, 10, 16).and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(
            random_activation_date(&mut rng, floor, now),
            Err(EpidError::FloorAfterNow { floor, now })
        );
    }

    #[test]
    fn test_day_of_year() {
        assert_eq!(day_of_year(date(2021, 1, 1)), 1);
        assert_eq!(day_of_year(date(2021, 2, 14)), 45);
        assert_eq!(day_of_year(date(2021, 12, 31)), 365);
        assert_eq!(day_of_year(date(2020, 12, 31)), 366);
        // US clocks jumped forward on 2014-03-09
        assert_eq!(day_of_year(date(2014, 3, 8)), 67);
        assert_eq!(day_of_year(date(2014, 3, 9)), 68);
        assert_eq!(day_of_year(date(2014, 3, 10)), 69);
        // and back on 2014-11-02
        assert_eq!(day_of_year(date(2014, 11, 2)), 306);
        assert_eq!(day_of_year(date(2014, 11, 3)), 307);
    }
}
