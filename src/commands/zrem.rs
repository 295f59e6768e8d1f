use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Removes the specified members from the sorted set stored at `key`.
///
/// Ref: <https://redis.io/docs/latest/commands/zrem/>
#[derive(Debug, PartialEq)]
pub struct ZRem {
    pub key: Bytes,
    pub members: Vec<Bytes>,
}

impl Executable for ZRem {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let removed = match store.get(&self.key) {
            Some(Value::SortedSet(zset)) => zset.remove(&self.members),
            Some(_) => return Err(CommandError::WrongType),
            None => 0,
        };

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for ZRem {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let members = parser.remaining(1)?;

        Ok(Self { key, members })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{parse, request};

    #[tokio::test]
    async fn removes_members() {
        let store = Store::new();
        parse(request(&["ZADD", "z", "1", "a", "2", "b"]))
            .unwrap()
            .exec(store.clone())
            .unwrap();

        let res = parse(request(&["ZREM", "z", "a", "nope"]))
            .unwrap()
            .exec(store.clone())
            .unwrap();
        assert_eq!(res, Frame::Integer(1));

        let res = parse(request(&["ZCARD", "z"]))
            .unwrap()
            .exec(store.clone())
            .unwrap();
        assert_eq!(res, Frame::Integer(1));
    }
}
