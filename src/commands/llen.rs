use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Returns the length of the list stored at `key`, 0 when the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/llen/>
#[derive(Debug, PartialEq)]
pub struct LLen {
    pub key: Bytes,
}

impl Executable for LLen {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let len = match store.get(&self.key) {
            Some(Value::List(list)) => list.len(),
            Some(_) => return Err(CommandError::WrongType),
            None => 0,
        };

        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for LLen {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        parser.finish()?;

        Ok(Self { key })
    }
}
