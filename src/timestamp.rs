use time::{Duration, OffsetDateTime};

use crate::{
    clock::Clock,
    error::{DecodeError, Result},
    format,
    signing::SEPARATOR,
};

/// Split the base62 timestamp off `value` and reject it if it is older than `max_age`.
///
/// The clock is read once, after the timestamp has been parsed.
pub(crate) fn check_max_age<'a, K: Clock>(
    value: &'a str,
    max_age: Duration,
    clock: &K,
) -> Result<&'a str> {
    let (payload, stamp) = value
        .rsplit_once(SEPARATOR)
        .ok_or(DecodeError::MalformedToken)?;

    let issued_at = issued_at(stamp)?;
    let deadline = issued_at
        .checked_add(max_age)
        .ok_or_else(|| DecodeError::InvalidTimestamp("expiry is out of range".into()))?;

    let now = clock.now();
    if deadline < now {
        return Err(DecodeError::Expired {
            issued_at: issued_at.unix_timestamp(),
            now: now.unix_timestamp(),
        });
    }

    Ok(payload)
}

fn issued_at(stamp: &str) -> Result<OffsetDateTime> {
    let seconds = format::base62_decode(stamp.as_bytes())?;
    let seconds = i64::try_from(seconds)
        .map_err(|_| DecodeError::InvalidTimestamp("timestamp is out of range".into()))?;
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|err| DecodeError::InvalidTimestamp(err.to_string()))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::clock::FixedClock;

    // 1XeDNx == 2014-10-15 01:28:17 UTC
    const VALUE: &str = "payload:1XeDNx";

    #[test]
    fn returns_payload_within_max_age() {
        let clock = FixedClock::new(datetime!(2014-10-20 0:00 UTC));
        assert_eq!(
            check_max_age(VALUE, Duration::days(14), &clock).expect("not expired"),
            "payload"
        );
    }

    #[test]
    fn boundary_is_inclusive() {
        let clock = FixedClock::new(datetime!(2014-10-29 1:28:17 UTC));
        assert!(check_max_age(VALUE, Duration::days(14), &clock).is_ok());

        let clock = FixedClock::new(datetime!(2014-10-29 1:28:18 UTC));
        assert!(matches!(
            check_max_age(VALUE, Duration::days(14), &clock),
            Err(DecodeError::Expired {
                issued_at: 1413336497,
                now: 1414546098,
            })
        ));
    }

    #[test]
    fn splits_on_last_separator() {
        let clock = FixedClock::new(datetime!(2014-10-15 2:00 UTC));
        assert_eq!(
            check_max_age("a:b:1XeDNx", Duration::hours(1), &clock).expect("not expired"),
            "a:b"
        );
    }

    #[test]
    fn missing_separator() {
        let clock = FixedClock::new(datetime!(2014-10-15 0:00 UTC));
        assert!(matches!(
            check_max_age("1XeDNx", Duration::days(14), &clock),
            Err(DecodeError::MalformedToken)
        ));
    }

    #[test]
    fn invalid_timestamps() {
        let clock = FixedClock::new(datetime!(2014-10-15 0:00 UTC));
        for value in ["payload:", "payload:1Xe-Nx", "payload:zzzzzzzzzz"] {
            assert!(matches!(
                check_max_age(value, Duration::days(14), &clock),
                Err(DecodeError::InvalidTimestamp(_))
            ));
        }
    }
}
