use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Removes the specified fields from the hash stored at `key` and returns how many existed.
///
/// Ref: <https://redis.io/docs/latest/commands/hdel/>
#[derive(Debug, PartialEq)]
pub struct HDel {
    pub key: Bytes,
    pub fields: Vec<Bytes>,
}

impl Executable for HDel {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let removed = match store.get(&self.key) {
            Some(Value::Hash(hash)) => hash.delete(&self.fields),
            Some(_) => return Err(CommandError::WrongType),
            None => 0,
        };

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for HDel {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let fields = parser.remaining(1)?;

        Ok(Self { key, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{parse, request};

    #[tokio::test]
    async fn removes_fields() {
        let store = Store::new();
        parse(request(&["HSET", "h", "a", "1", "b", "2"]))
            .unwrap()
            .exec(store.clone())
            .unwrap();

        let res = parse(request(&["HDEL", "h", "a", "zz"]))
            .unwrap()
            .exec(store.clone())
            .unwrap();

        assert_eq!(res, Frame::Integer(1));
    }

    #[test]
    fn requires_a_field() {
        assert!(parse(request(&["HDEL", "h"])).is_err());
    }
}
