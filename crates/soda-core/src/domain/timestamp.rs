use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::ValidationError;

const UTC_ZONE_NAMES: [&str; 3] = ["GMT", "UTC", "UT"];

/// UTC timestamp carried by HTTP headers such as `Date` and
/// `X-SODA2-Truth-Last-Modified`.
///
/// Wire form is RFC 1123: `Wed, 21 Oct 2015 07:28:00 GMT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HttpDate(OffsetDateTime);

impl HttpDate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidHttpDate {
            value: input.to_owned(),
        };

        let (body, zone) = input.trim().rsplit_once(' ').ok_or_else(invalid)?;
        if !UTC_ZONE_NAMES
            .iter()
            .any(|name| name.eq_ignore_ascii_case(zone))
        {
            return Err(invalid());
        }

        let parsed = PrimitiveDateTime::parse(
            body,
            format_description!(
                "[weekday repr:short case_sensitive:false], [day padding:none] [month repr:short case_sensitive:false] [year] [hour]:[minute]:[second]"
            ),
        )
        .map_err(|_| invalid())?;

        Ok(Self(parsed.assume_utc()))
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn format_rfc1123(self) -> String {
        self.0
            .format(format_description!(
                "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
            ))
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }
}

impl Display for HttpDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc1123())
    }
}

impl Serialize for HttpDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}
