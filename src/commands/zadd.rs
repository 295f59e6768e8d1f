use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{parse_score, CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Adds all the specified members with the specified scores to the sorted set stored at `key`.
/// If a specified member is already a member of the sorted set, the score is updated and the
/// element reinserted at the right position to ensure the correct ordering.
///
/// Every score is validated before the sorted set is touched, so a malformed score leaves the
/// key unchanged. Returns the number of members that were added or whose score changed.
///
/// Ref: <https://redis.io/docs/latest/commands/zadd/>
#[derive(Debug, PartialEq)]
pub struct ZAdd {
    pub key: Bytes,
    pub members: Vec<(f64, Bytes)>,
}

impl Executable for ZAdd {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let zset = match store.get_or_insert_with(&self.key, Value::empty_sorted_set) {
            Value::SortedSet(zset) => zset,
            _ => return Err(CommandError::WrongType),
        };

        let changed: usize = self
            .members
            .into_iter()
            .map(|(score, member)| zset.add(score, member))
            .sum();

        Ok(Frame::Integer(changed as i64))
    }
}

impl TryFrom<&mut CommandParser> for ZAdd {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let members = parser
            .pairs()?
            .into_iter()
            .map(|(score, member)| Ok((parse_score(&score)?, member)))
            .collect::<Result<Vec<_>, CommandError>>()?;

        Ok(Self { key, members })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{parse, request, Command};

    #[tokio::test]
    async fn ordering_and_update() {
        let cmd = parse(request(&["ZADD", "z", "3", "c", "1", "a", "2", "b"])).unwrap();
        assert_eq!(
            cmd,
            Command::ZAdd(ZAdd {
                key: Bytes::from("z"),
                members: vec![
                    (3.0, Bytes::from("c")),
                    (1.0, Bytes::from("a")),
                    (2.0, Bytes::from("b")),
                ],
            })
        );

        let store = Store::new();
        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(3));

        let cmd = parse(request(&["ZADD", "z", "5", "a"])).unwrap();
        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(1));

        let cmd = parse(request(&["ZADD", "z", "5", "a"])).unwrap();
        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(0));

        match store.get(b"z") {
            Some(Value::SortedSet(zset)) => {
                let members: Vec<Bytes> = zset
                    .members_by_score()
                    .into_iter()
                    .map(|(member, _)| member)
                    .collect();
                assert_eq!(
                    members,
                    vec![Bytes::from("b"), Bytes::from("c"), Bytes::from("a")]
                );
            }
            other => panic!("expected a sorted set, got {:?}", other),
        }
    }

    #[test]
    fn invalid_score() {
        let err = parse(request(&["ZADD", "z", "1", "a", "x", "b"])).unwrap_err();
        assert_eq!(err, CommandError::NotAFloat);
    }

    #[test]
    fn odd_pairs() {
        assert_eq!(
            parse(request(&["ZADD", "z", "1"])),
            Err(CommandError::WrongNumberOfArguments {
                command: "zadd".to_string()
            })
        );
    }
}
