use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Removes and returns the last element of the list stored at `key`.
///
/// Ref: <https://redis.io/docs/latest/commands/rpop/>
#[derive(Debug, PartialEq)]
pub struct RPop {
    pub key: Bytes,
}

impl Executable for RPop {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let popped = match store.get(&self.key) {
            Some(Value::List(list)) => list.pop_back(),
            Some(_) => return Err(CommandError::WrongType),
            None => None,
        };

        Ok(popped.map_or(Frame::NullBulkString, Frame::Bulk))
    }
}

impl TryFrom<&mut CommandParser> for RPop {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        parser.finish()?;

        Ok(Self { key })
    }
}
