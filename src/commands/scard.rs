use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

// https://redis.io/commands/scard
#[derive(Debug, PartialEq)]
pub struct SCard {
    pub key: Bytes,
}

impl Executable for SCard {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let cardinality = match store.get(&self.key) {
            Some(Value::Set(set)) => set.cardinality(),
            Some(_) => return Err(CommandError::WrongType),
            None => 0,
        };

        Ok(Frame::Integer(cardinality as i64))
    }
}

impl TryFrom<&mut CommandParser> for SCard {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        parser.finish()?;

        Ok(Self { key })
    }
}
