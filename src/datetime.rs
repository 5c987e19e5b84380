//! The `<dateTime.iso8601>` value type.

use crate::error::{DecodeError, EncodeError};

use iso8601::{Date, Time};

use std::fmt::{self, Display, Formatter};

/// A calendar date and time of day, with second precision and without a time zone.
///
/// This is the basic XML-RPC date-time, `19980717T14:08:55` on the wire. The fields are not
/// validated on construction; the year is checked when encoding, the remaining fields when
/// decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    pub fn new(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        DateTime { year, month, day, hour, minute, second }
    }

    /// Formats this date-time as `CCYYMMDDTHH:MM:SS`.
    ///
    /// # Errors
    ///
    /// Fails with `YearOutOfRange` if the year does not fit in four digits.
    pub fn to_wire(&self) -> Result<String, EncodeError> {
        if !(0..=9999).contains(&self.year) {
            return Err(EncodeError::YearOutOfRange(self.year));
        }

        Ok(format!(
            "{:04}{:02}{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        ))
    }

    /// Parses the leading `CCYYMMDDTHH:MM:SS` of `text`.
    ///
    /// Anything after the seconds (fractions, a zone designator) is ignored.
    pub fn parse_wire(text: &str) -> Result<Self, DecodeError> {
        let malformed = || DecodeError::MalformedDateTime(text.to_string());

        let bytes = text.trim().as_bytes();
        if bytes.len() < 17 || bytes[8] != b'T' || bytes[11] != b':' || bytes[14] != b':' {
            return Err(malformed());
        }

        let digits = |range: std::ops::Range<usize>| -> Result<u32, DecodeError> {
            bytes[range].iter().try_fold(0u32, |acc, &b| {
                if b.is_ascii_digit() {
                    Ok(acc * 10 + u32::from(b - b'0'))
                } else {
                    Err(malformed())
                }
            })
        };

        let year = digits(0..4)?;
        let month = digits(4..6)?;
        let day = digits(6..8)?;
        let hour = digits(9..11)?;
        let minute = digits(12..14)?;
        let second = digits(15..17)?;

        // leap seconds are allowed
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) || hour > 23 || minute > 59 || second > 60 {
            return Err(malformed());
        }

        // all fields are at most 2 digits (or 4 for the year), so the casts are lossless
        Ok(DateTime::new(year as i32, month as u8, day as u8, hour as u8, minute as u8, second as u8))
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl From<DateTime> for iso8601::DateTime {
    fn from(dt: DateTime) -> Self {
        iso8601::DateTime {
            date: Date::YMD {
                year: dt.year,
                month: dt.month.into(),
                day: dt.day.into(),
            },
            time: Time {
                hour: dt.hour.into(),
                minute: dt.minute.into(),
                second: dt.second.into(),
                millisecond: 0,
                tz_offset_hours: 0,
                tz_offset_minutes: 0,
            },
        }
    }
}

/// Converts a calendar (`YYYY-MM-DD`) ISO 8601 date-time.
///
/// Milliseconds and the zone offset are dropped, XML-RPC date-times carry neither. Week and
/// ordinal dates are rejected.
impl TryFrom<iso8601::DateTime> for DateTime {
    type Error = EncodeError;

    fn try_from(dt: iso8601::DateTime) -> Result<Self, Self::Error> {
        let Time { hour, minute, second, .. } = dt.time;

        match dt.date {
            Date::YMD { year, month, day } => {
                let field = |v: u32| {
                    u8::try_from(v).map_err(|_| {
                        EncodeError::UnsupportedValueKind(format!("date-time field out of range: {}", v))
                    })
                };
                Ok(DateTime::new(year, field(month)?, field(day)?, field(hour)?, field(minute)?, field(second)?))
            }
            Date::Week { .. } => Err(EncodeError::UnsupportedValueKind("ISO 8601 week date".into())),
            Date::Ordinal { .. } => Err(EncodeError::UnsupportedValueKind("ISO 8601 ordinal date".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(DateTime::new(998, 7, 1, 4, 8, 5).to_wire().unwrap(), "09980701T04:08:05");
        assert_eq!(DateTime::new(0, 1, 1, 0, 0, 0).to_wire().unwrap(), "00000101T00:00:00");
        assert_eq!(DateTime::new(9999, 12, 31, 23, 59, 59).to_wire().unwrap(), "99991231T23:59:59");
    }

    #[test]
    fn rejects_out_of_range_years() {
        assert!(matches!(DateTime::new(10000, 1, 1, 0, 0, 0).to_wire(), Err(EncodeError::YearOutOfRange(10000))));
        assert!(matches!(DateTime::new(-1, 1, 1, 0, 0, 0).to_wire(), Err(EncodeError::YearOutOfRange(-1))));
    }

    #[test]
    fn parses_wire_format() {
        assert_eq!(DateTime::parse_wire("19980717T14:08:55").unwrap(), DateTime::new(1998, 7, 17, 14, 8, 55));
        assert_eq!(DateTime::parse_wire("19980717T14:08:55Z").unwrap(), DateTime::new(1998, 7, 17, 14, 8, 55));
        assert_eq!(DateTime::parse_wire(" 19980717T14:08:55.123+02:00").unwrap(), DateTime::new(1998, 7, 17, 14, 8, 55));
    }

    #[test]
    fn rejects_malformed_dates() {
        for text in &["", "ILLEGAL VALUE :(", "1998-07-17T14:08:55", "19981317T14:08:55", "19980717T24:08:55", "1998071714:08:55x"] {
            assert!(
                matches!(DateTime::parse_wire(text), Err(DecodeError::MalformedDateTime(_))),
                "accepted {:?}", text
            );
        }
    }

    #[test]
    fn converts_iso8601() {
        let parsed = iso8601::datetime("2016-05-02T06:01:05-0830").unwrap();
        let dt = DateTime::try_from(parsed).unwrap();
        assert_eq!(dt, DateTime::new(2016, 5, 2, 6, 1, 5));

        let back = iso8601::DateTime::from(dt);
        assert_eq!(DateTime::try_from(back).unwrap(), dt);

        let week = iso8601::DateTime {
            date: Date::Week { year: 2016, ww: 18, d: 1 },
            time: iso8601::DateTime::from(dt).time,
        };
        assert!(matches!(DateTime::try_from(week), Err(EncodeError::UnsupportedValueKind(_))));
    }
}
