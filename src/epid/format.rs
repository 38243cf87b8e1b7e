//! ePID text encoding and decoding
//!
//! ```text
//! #####-#####-###-######-##-####-####.0000-###YYYY
//! type  group key  key    ch lang build    day year
//! ```

use super::Epid;
use crate::error::EpidError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Literal separating the host build from the activation date
const BUILD_SUFFIX: &str = ".0000-";

/// Widths of the dash-delimited fields before the build suffix.
/// `None` is the language code, written at its natural width.
const HEAD_WIDTHS: [Option<usize>; 7] =
    [Some(5), Some(5), Some(3), Some(6), Some(2), None, Some(4)];

impl fmt::Display for Epid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:05}-{:05}-{:03}-{:06}-{:02}-{}-{:04}{}{:03}{:04}",
            self.host_type,
            self.group_id,
            self.key_major(),
            self.key_minor(),
            self.license_channel,
            self.language,
            self.os_build,
            BUILD_SUFFIX,
            self.day_of_year(),
            self.year(),
        )
    }
}

impl FromStr for Epid {
    type Err = EpidError;

    fn from_str(s: &str) -> Result<Self, EpidError> {
        let fail = |reason| EpidError::Parse {
            input: s.to_string(),
            reason,
        };

        let (head, tail) = s
            .split_once(BUILD_SUFFIX)
            .ok_or_else(|| fail("missing '.0000-' separator"))?;

        let parts: Vec<&str> = head.split('-').collect();
        if parts.len() != HEAD_WIDTHS.len() {
            return Err(fail("expected seven dash-separated fields before '.0000-'"));
        }

        let mut fields = [0u32; 7];
        for ((part, width), slot) in parts.iter().zip(HEAD_WIDTHS).zip(fields.iter_mut()) {
            *slot = parse_digits(part, width)
                .ok_or_else(|| fail("field has the wrong width or a non-digit"))?;
        }
        let [host_type, group_id, key_major, key_minor, license_channel, language, os_build] =
            fields;

        if tail.len() != 7 {
            return Err(fail("activation date must be 3 day digits followed by 4 year digits"));
        }
        let (day, year) = tail.split_at(3);
        let day = parse_digits(day, Some(3)).ok_or_else(|| fail("day of year is not numeric"))?;
        let year = parse_digits(year, Some(4)).ok_or_else(|| fail("year is not numeric"))?;
        let activation_date = NaiveDate::from_yo_opt(year as i32, day)
            .ok_or_else(|| fail("day of year does not exist in that year"))?;

        Ok(Epid {
            host_type,
            group_id,
            key_id: key_major * 1_000_000 + key_minor,
            license_channel,
            language,
            os_build,
            activation_date,
        })
    }
}

/// Parse an all-digit field, optionally of an exact width.
fn parse_digits(s: &str, width: Option<usize>) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match width {
        Some(width) if s.len() != width => None,
        // u32 holds any nine digits
        None if s.len() > 9 => None,
        _ => s.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Epid {
        Epid {
            host_type: 6401,
            group_id: 206,
            key_id: 271_000_345,
            license_channel: 3,
            language: 1033,
            os_build: 9600,
            activation_date: NaiveDate::from_ymd_opt(2021, 2, 14).unwrap(),
        }
    }

    #[test]
    fn test_format_pads_every_field() {
        assert_eq!(sample().to_string(), "06401-00206-271-000345-03-1033-9600.0000-0452021");
    }

    #[test]
    fn test_format_first_day_of_year() {
        let epid = Epid {
            host_type: 55041,
            group_id: 96,
            key_id: 199_000_000,
            os_build: 7601,
            activation_date: NaiveDate::from_ymd_opt(2012, 1, 1).unwrap(),
            ..sample()
        };
        assert_eq!(epid.to_string(), "55041-00096-199-000000-03-1033-7601.0000-0012012");
    }

    #[test]
    fn test_parse_decodes_fields() {
        let epid: Epid = "05426-00206-234-987654-03-1033-9200.0000-3662016".parse().unwrap();
        assert_eq!(epid.host_type, 5426);
        assert_eq!(epid.group_id, 206);
        assert_eq!(epid.key_id, 234_987_654);
        assert_eq!(epid.license_channel, 3);
        assert_eq!(epid.language, 1033);
        assert_eq!(epid.os_build, 9200);
        assert_eq!(epid.activation_date, NaiveDate::from_ymd_opt(2016, 12, 31).unwrap());
    }

    #[test]
    fn test_parse_accepts_other_language_widths() {
        let epid: Epid = "05426-00206-234-987654-03-3082-9200.0000-0012016".parse().unwrap();
        assert_eq!(epid.language, 3082);
        let epid: Epid = "05426-00206-234-987654-03-31-9200.0000-0012016".parse().unwrap();
        assert_eq!(epid.language, 31);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let bad = [
            "",
            "06401-00206-271-000345-03-1033-9600-0452021",
            "6401-00206-271-000345-03-1033-9600.0000-0452021",
            "06401-00206-271-000345-03-1033-9600.0000-045-2021",
            "06401-00206-271-00034a-03-1033-9600.0000-0452021",
            "06401-00206-271-000345-03-1033-9600.0000-3662021",
            "06401-00206-271-000345-03-1033-9600.0000-0002021",
            "06401-00206-271-000345-03--9600.0000-0452021",
            "06401-00206-271-000345-03-1033-1-9600.0000-0452021",
        ];
        for input in bad {
            assert!(
                matches!(input.parse::<Epid>(), Err(EpidError::Parse { .. })),
                "{input:?} should be rejected"
            );
        }
    }
}
