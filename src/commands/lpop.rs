use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Removes and returns the first element of the list stored at `key`, or `nil` when the key does
/// not exist or the list is empty.
///
/// Ref: <https://redis.io/docs/latest/commands/lpop/>
#[derive(Debug, PartialEq)]
pub struct LPop {
    pub key: Bytes,
}

impl Executable for LPop {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let popped = match store.get(&self.key) {
            Some(Value::List(list)) => list.pop_front(),
            Some(_) => return Err(CommandError::WrongType),
            None => None,
        };

        Ok(popped.map_or(Frame::NullBulkString, Frame::Bulk))
    }
}

impl TryFrom<&mut CommandParser> for LPop {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        parser.finish()?;

        Ok(Self { key })
    }
}
