use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Returns the value associated with `field` in the hash stored at `key`.
///
/// Ref: <https://redis.io/docs/latest/commands/hget/>
#[derive(Debug, PartialEq)]
pub struct HGet {
    pub key: Bytes,
    pub field: Bytes,
}

impl Executable for HGet {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let value = match store.get(&self.key) {
            Some(Value::Hash(hash)) => hash.get(&self.field),
            Some(_) => return Err(CommandError::WrongType),
            None => None,
        };

        Ok(value.map_or(Frame::NullBulkString, Frame::Bulk))
    }
}

impl TryFrom<&mut CommandParser> for HGet {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let field = parser.next_bytes()?;
        parser.finish()?;

        Ok(Self { key, field })
    }
}
