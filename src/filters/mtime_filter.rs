use crate::{FileFilter, Result, SnoopError, util::unix_now};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clap::{
    Arg, Command, Error,
    builder::{PossibleValue, TypedValueParser},
    error::{ContextKind, ContextValue, ErrorKind},
};
use core::{cmp::Ordering, fmt, str::FromStr};
use std::{
    ffi::OsStr,
    os::unix::fs::MetadataExt as _,
    path::Path,
};

/**
 Three-way comparison of the reference timestamp against a file's mtime.

 Returns `Less` when `reference < file_mtime`, `Equal` when they match and
 `Greater` when `reference > file_mtime`.
*/
#[inline]
#[must_use]
pub fn compare_mtime(reference: i64, file_mtime: i64) -> Ordering {
    reference.cmp(&file_mtime)
}

/// The comparison outcomes that let a file through
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(clippy::struct_excessive_bools)]
pub struct AcceptedOrderings {
    pub less: bool,
    pub equal: bool,
    pub greater: bool,
}

impl AcceptedOrderings {
    #[inline]
    #[must_use]
    pub const fn contains(self, ordering: Ordering) -> bool {
        match ordering {
            Ordering::Less => self.less,
            Ordering::Equal => self.equal,
            Ordering::Greater => self.greater,
        }
    }
}

impl Default for AcceptedOrderings {
    /// `reference <= mtime`
    fn default() -> Self {
        MtimeOperator::LessOrEqual.accepted()
    }
}

/**
 Operator relating the reference timestamp to a file's mtime, read as
 `reference OP mtime`.

 # Examples
 ```
 use snoop::MtimeOperator;

 let op: MtimeOperator = ">=".parse().unwrap();
 assert_eq!(op, MtimeOperator::GreaterOrEqual);
 assert!("=".parse::<MtimeOperator>().is_err());
 ```
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_enums)]
pub enum MtimeOperator {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl MtimeOperator {
    /// The orderings this operator accepts
    #[must_use]
    pub const fn accepted(self) -> AcceptedOrderings {
        match self {
            Self::Less => AcceptedOrderings {
                less: true,
                equal: false,
                greater: false,
            },
            Self::LessOrEqual => AcceptedOrderings {
                less: true,
                equal: true,
                greater: false,
            },
            Self::Greater => AcceptedOrderings {
                less: false,
                equal: false,
                greater: true,
            },
            Self::GreaterOrEqual => AcceptedOrderings {
                less: false,
                equal: true,
                greater: true,
            },
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for MtimeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MtimeOperator {
    type Err = SnoopError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "<" => Ok(Self::Less),
            "<=" => Ok(Self::LessOrEqual),
            ">" => Ok(Self::Greater),
            ">=" => Ok(Self::GreaterOrEqual),
            _ => Err(SnoopError::InvalidMtimeOperator(s.to_owned())),
        }
    }
}

/**
 Keeps files whose mtime relates to the reference timestamp as configured.

 The mtime is read live with `stat` on every call, nothing is cached. Files
 that vanish between listing and stat surface as an IO error.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MtimeFilter {
    reference: i64,
    accepted: AcceptedOrderings,
}

impl MtimeFilter {
    #[must_use]
    pub const fn new(reference: i64, accepted: AcceptedOrderings) -> Self {
        Self {
            reference,
            accepted,
        }
    }

    #[must_use]
    pub const fn reference(&self) -> i64 {
        self.reference
    }

    #[must_use]
    pub const fn accepted(&self) -> AcceptedOrderings {
        self.accepted
    }

    #[inline]
    #[must_use]
    pub fn matches_mtime(&self, file_mtime: i64) -> bool {
        self.accepted
            .contains(compare_mtime(self.reference, file_mtime))
    }
}

impl Default for MtimeFilter {
    fn default() -> Self {
        Self::new(unix_now(), AcceptedOrderings::default())
    }
}

impl FileFilter for MtimeFilter {
    #[inline]
    fn accepts(&self, path: &Path) -> Result<bool> {
        let mtime = std::fs::metadata(path)?.mtime();
        Ok(self.matches_mtime(mtime))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::exhaustive_enums)]
pub enum ParseTimestampError {
    Empty,
    InvalidFormat,
}

impl fmt::Display for ParseTimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Empty => write!(f, "empty timestamp"),
            Self::InvalidFormat => write!(f, "invalid timestamp format"),
        }
    }
}

impl core::error::Error for ParseTimestampError {}

/**
 Parses a reference timestamp into seconds since the Unix epoch.

 Accepted forms:
 - `now`
 - integer seconds, eg `1300147200` (negative values are before the epoch)
 - RFC 3339, eg `2011-03-15T00:00:00+01:00`
 - `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS`, taken as UTC
 - `YYYY-MM-DD`, midnight UTC

 # Errors
 Returns [`ParseTimestampError`] when none of the forms match.
*/
pub fn parse_timestamp(input: &str) -> core::result::Result<i64, ParseTimestampError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ParseTimestampError::Empty);
    }

    if s.eq_ignore_ascii_case("now") {
        return Ok(unix_now());
    }

    if let Ok(seconds) = s.parse::<i64>() {
        return Ok(seconds);
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
        return Ok(datetime.timestamp());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc().timestamp());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp())
        .ok_or(ParseTimestampError::InvalidFormat)
}

/// A custom parser that rejects anything outside of `<`, `>`, `<=`, `>=` with a helpful message
#[derive(Clone, Debug)]
#[allow(clippy::exhaustive_structs)]
pub struct MtimeOperatorParser;

impl TypedValueParser for MtimeOperatorParser {
    type Value = MtimeOperator;

    fn parse_ref(
        &self,
        cmd: &Command,
        _arg: Option<&Arg>,
        value: &OsStr,
    ) -> core::result::Result<Self::Value, Error> {
        let value_str = value
            .to_str()
            .ok_or_else(|| Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd))?;

        value_str.parse::<MtimeOperator>().map_err(|err| {
            let mut error = Error::new(ErrorKind::InvalidValue).with_cmd(cmd);
            error.insert(
                ContextKind::InvalidValue,
                ContextValue::String(value_str.to_owned()),
            );
            error.insert(
                ContextKind::SuggestedValue,
                ContextValue::String(err.to_string()),
            );
            error.insert(
                ContextKind::ValidValue,
                ContextValue::Strings(vec!["<".into(), "<=".into(), ">".into(), ">=".into()]),
            );
            error
        })
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        Some(Box::new(
            [
                PossibleValue::new("<").help("reference older than the file"),
                PossibleValue::new("<=").help("reference older than or as old as the file"),
                PossibleValue::new(">").help("reference newer than the file"),
                PossibleValue::new(">=").help("reference newer than or as new as the file"),
            ]
            .into_iter(),
        ))
    }
}

/// Parses `--mtime` values, see [`parse_timestamp`]
#[derive(Clone, Debug)]
#[allow(clippy::exhaustive_structs)]
pub struct TimestampParser;

impl TypedValueParser for TimestampParser {
    type Value = i64;

    fn parse_ref(
        &self,
        cmd: &Command,
        _arg: Option<&Arg>,
        value: &OsStr,
    ) -> core::result::Result<Self::Value, Error> {
        let value_str = value
            .to_str()
            .ok_or_else(|| Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd))?;

        parse_timestamp(value_str).map_err(|err| {
            let mut error = Error::new(ErrorKind::InvalidValue).with_cmd(cmd);

            error.insert(
                ContextKind::InvalidValue,
                ContextValue::String(format!("{err}")),
            );

            error.insert(
                ContextKind::SuggestedValue,
                ContextValue::Strings(vec![
                    "now".into(),
                    "1300147200".into(),
                    "2011-03-15".into(),
                    "2011-03-15 12:30:00".into(),
                    "2011-03-15T12:30:00+01:00".into(),
                ]),
            );

            error
        })
    }
}
