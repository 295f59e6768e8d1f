use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

// https://redis.io/commands/hlen
#[derive(Debug, PartialEq)]
pub struct HLen {
    pub key: Bytes,
}

impl Executable for HLen {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let len = match store.get(&self.key) {
            Some(Value::Hash(hash)) => hash.len(),
            Some(_) => return Err(CommandError::WrongType),
            None => 0,
        };

        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for HLen {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        parser.finish()?;

        Ok(Self { key })
    }
}
