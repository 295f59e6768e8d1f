use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::{format_double, Frame};
use crate::store::{Store, Value};

/// Returns the score of `member` in the sorted set at `key` as a bulk string, or `nil` when
/// either the key or the member does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/zscore/>
#[derive(Debug, PartialEq)]
pub struct ZScore {
    pub key: Bytes,
    pub member: Bytes,
}

impl Executable for ZScore {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let score = match store.get(&self.key) {
            Some(Value::SortedSet(zset)) => zset.score(&self.member),
            Some(_) => return Err(CommandError::WrongType),
            None => None,
        };

        Ok(score.map_or(Frame::NullBulkString, |score| {
            Frame::Bulk(Bytes::from(format_double(score)))
        }))
    }
}

impl TryFrom<&mut CommandParser> for ZScore {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let member = parser.next_bytes()?;
        parser.finish()?;

        Ok(Self { key, member })
    }
}
