use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Insert all the specified values at the head of the list stored at `key`. If `key` does not
/// exist, it is created as empty list before performing the push operation.
///
/// The values are inserted as one block and keep the order they were given in, so
/// `LPUSH mylist a b c` leaves `a b c` at the head of the list.
///
/// Ref: <https://redis.io/docs/latest/commands/lpush/>
#[derive(Debug, PartialEq)]
pub struct LPush {
    pub key: Bytes,
    pub values: Vec<Bytes>,
}

impl Executable for LPush {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let list = match store.get_or_insert_with(&self.key, Value::empty_list) {
            Value::List(list) => list,
            _ => return Err(CommandError::WrongType),
        };

        let len = list.push_front(self.values);
        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for LPush {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let values = parser.remaining(1)?;

        Ok(Self { key, values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{parse, request, Command};

    #[tokio::test]
    async fn creates_list() {
        let cmd = parse(request(&["LPUSH", "l", "a", "b"])).unwrap();
        assert_eq!(
            cmd,
            Command::LPush(LPush {
                key: Bytes::from("l"),
                values: vec![Bytes::from("a"), Bytes::from("b")],
            })
        );

        let store = Store::new();
        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(2));

        let cmd = parse(request(&["LPUSH", "l", "c"])).unwrap();
        assert_eq!(cmd.exec(store.clone()).unwrap(), Frame::Integer(3));

        match store.get(b"l") {
            Some(Value::List(list)) => assert_eq!(
                list.to_vec(),
                vec![Bytes::from("c"), Bytes::from("a"), Bytes::from("b")]
            ),
            other => panic!("expected a list, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn wrong_type() {
        let store = Store::new();
        store.set(Bytes::from("k"), Value::from(Bytes::from("v")), None);

        let cmd = parse(request(&["LPUSH", "k", "a"])).unwrap();

        assert_eq!(cmd.exec(store.clone()), Err(CommandError::WrongType));
        assert_eq!(store.type_of(b"k"), "string");
    }

    #[test]
    fn requires_a_value() {
        assert!(parse(request(&["LPUSH", "k"])).is_err());
    }
}
