use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Insert all the specified values at the tail of the list stored at `key`, creating the list
/// when `key` does not exist. Returns the length of the list after the push.
///
/// Ref: <https://redis.io/docs/latest/commands/rpush/>
#[derive(Debug, PartialEq)]
pub struct RPush {
    pub key: Bytes,
    pub values: Vec<Bytes>,
}

impl Executable for RPush {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let list = match store.get_or_insert_with(&self.key, Value::empty_list) {
            Value::List(list) => list,
            _ => return Err(CommandError::WrongType),
        };

        let len = list.push_back(self.values);
        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for RPush {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let values = parser.remaining(1)?;

        Ok(Self { key, values })
    }
}
