use bytes::Bytes;
use std::str;
use tokio::time::Duration;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Largest `EX` accepted, so the deadline computed from it cannot overflow.
const MAX_EXPIRE_SECONDS: i64 = i64::MAX / 1000;

/// Set `key` to hold the string `value`. If `key` already holds a value, it is overwritten,
/// regardless of its type. Any previous time to live associated with the key is discarded.
///
/// Options:
/// * `EX seconds` -- Set the specified expire time, in seconds (a positive integer).
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: Bytes,
    pub value: Bytes,
    pub ttl: Option<Duration>,
}

impl Executable for Set {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        store.set(self.key, Value::String(self.value), self.ttl);
        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let value = parser.next_bytes()?;

        let mut ttl = None;
        while let Some(option) = parser.next_optional() {
            if ttl.is_some() || !option.eq_ignore_ascii_case(b"EX") {
                return Err(CommandError::Syntax);
            }
            let seconds = parser.next_optional().ok_or(CommandError::Syntax)?;
            ttl = Some(parse_expire(parser.command(), &seconds)?);
        }

        Ok(Self { key, value, ttl })
    }
}

fn parse_expire(command: &str, seconds: &[u8]) -> Result<Duration, CommandError> {
    let invalid = || CommandError::InvalidExpireTime {
        command: command.to_string(),
    };

    let seconds = str::from_utf8(seconds)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(invalid)?;

    if !(1..=MAX_EXPIRE_SECONDS).contains(&seconds) {
        return Err(invalid());
    }

    Ok(Duration::from_secs(seconds as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{parse, request, Command};
    use tokio::time;

    #[tokio::test]
    async fn simple_set() {
        let cmd = parse(request(&["SET", "foo", "bar"])).unwrap();

        assert_eq!(
            cmd,
            Command::Set(Set {
                key: Bytes::from("foo"),
                value: Bytes::from("bar"),
                ttl: None,
            })
        );

        let store = Store::new();
        let res = cmd.exec(store.clone()).unwrap();

        assert_eq!(res, Frame::ok());
        assert!(matches!(store.get(b"foo"), Some(Value::String(v)) if v == "bar"));
    }

    #[tokio::test]
    async fn with_expiration() {
        time::pause();

        let cmd = parse(request(&["SET", "foo", "bar", "ex", "1"])).unwrap();
        assert_eq!(
            cmd,
            Command::Set(Set {
                key: Bytes::from("foo"),
                value: Bytes::from("bar"),
                ttl: Some(Duration::from_secs(1)),
            })
        );

        let store = Store::new();
        cmd.exec(store.clone()).unwrap();
        assert!(store.exists(b"foo"));

        time::advance(Duration::from_secs(1)).await;
        assert!(!store.exists(b"foo"));
    }

    #[tokio::test]
    async fn overwrites_other_types() {
        let store = Store::new();
        store.get_or_insert_with(&Bytes::from("foo"), Value::empty_list);

        let cmd = parse(request(&["SET", "foo", "bar"])).unwrap();
        cmd.exec(store.clone()).unwrap();

        assert_eq!(store.type_of(b"foo"), "string");
    }

    #[test]
    fn invalid_expire_time() {
        let expected = Err(CommandError::InvalidExpireTime {
            command: "set".to_string(),
        });

        assert_eq!(parse(request(&["SET", "k", "v", "EX", "0"])), expected);
        assert_eq!(parse(request(&["SET", "k", "v", "EX", "-5"])), expected);
        assert_eq!(parse(request(&["SET", "k", "v", "EX", "soon"])), expected);
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(
            parse(request(&["SET", "k", "v", "EX"])),
            Err(CommandError::Syntax)
        );
        assert_eq!(
            parse(request(&["SET", "k", "v", "KEEPTTL"])),
            Err(CommandError::Syntax)
        );
        assert_eq!(
            parse(request(&["SET", "k", "v", "EX", "1", "EX", "2"])),
            Err(CommandError::Syntax)
        );
    }

    #[test]
    fn missing_value() {
        assert_eq!(
            parse(request(&["SET", "k"])),
            Err(CommandError::WrongNumberOfArguments {
                command: "set".to_string()
            })
        );
    }
}
