use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

// https://redis.io/commands/zcard
#[derive(Debug, PartialEq)]
pub struct ZCard {
    pub key: Bytes,
}

impl Executable for ZCard {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let cardinality = match store.get(&self.key) {
            Some(Value::SortedSet(zset)) => zset.cardinality(),
            Some(_) => return Err(CommandError::WrongType),
            None => 0,
        };

        Ok(Frame::Integer(cardinality as i64))
    }
}

impl TryFrom<&mut CommandParser> for ZCard {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        parser.finish()?;

        Ok(Self { key })
    }
}
