// https://redis.io/docs/reference/protocol-spec

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use std::io::Cursor;
use std::string::FromUtf8Error;
use thiserror::Error as ThisError;

static CRLF: &[u8; 2] = b"\r\n";

/// Arrays nested deeper than this are rejected instead of recursed into.
pub const MAX_NESTING_DEPTH: usize = 128;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Not enough data is buffered yet. The decoder asks for more bytes instead of failing.
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("invalid frame data type: {0:?}")]
    InvalidDataType(char),
    #[error("line is not terminated by CRLF")]
    InvalidLineEnding,
    #[error("invalid integer: {0:?}")]
    InvalidInteger(String),
    #[error("invalid length: {0}")]
    InvalidLength(i64),
    #[error("invalid boolean: {0:?}")]
    InvalidBoolean(String),
    #[error("invalid double: {0:?}")]
    InvalidDouble(String),
    #[error("invalid UTF-8 in simple string")]
    InvalidUtf8,
    #[error("arrays nested deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error("frame of {len} bytes exceeds the limit of {max} bytes")]
    FrameTooLarge { len: usize, max: usize },
    /// The peer closed the stream in the middle of a value.
    #[error("stream ended in the middle of a frame")]
    Truncated,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    NullBulkString,
    Array(Vec<Frame>),
    NullArray,
    Null,
    Boolean(bool),
    Double(f64),
}

// Protocol specification: https://redis.io/docs/reference/protocol-spec/
impl Frame {
    pub fn ok() -> Frame {
        Frame::Simple("OK".to_string())
    }

    /// Parses exactly one frame starting at the cursor position and leaves the cursor right after
    /// it. Returns [`Error::Incomplete`] when the buffer ends before the frame does.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Self::parse_nested(src, 0)
    }

    fn parse_nested(src: &mut Cursor<&[u8]>, depth: usize) -> Result<Self, Error> {
        // The first byte in an RESP-serialized payload always identifies its type.
        // Subsequent bytes constitute the type's contents.
        let first_byte = get_byte(src)?;
        let data_type = DataType::try_from(first_byte)?;

        match data_type {
            DataType::SimpleString => {
                let line = get_line(src)?;
                Ok(Frame::Simple(String::from_utf8(line.to_vec())?))
            }
            DataType::SimpleError => {
                let line = get_line(src)?;
                Ok(Frame::Error(String::from_utf8(line.to_vec())?))
            }
            DataType::Integer => {
                let line = get_line(src)?;
                Ok(Frame::Integer(parse_integer(line)?))
            }
            // $<length>\r\n<data>\r\n
            DataType::BulkString => {
                let length = parse_integer(get_line(src)?)?;

                match length {
                    -1 => Ok(Frame::NullBulkString),
                    length if length < 0 => Err(Error::InvalidLength(length)),
                    length => {
                        // The payload is read by its declared size, never by searching for CRLF,
                        // so it may contain any byte sequence.
                        let data = get_exact(src, length as usize)?;
                        Ok(Frame::Bulk(Bytes::copy_from_slice(data)))
                    }
                }
            }
            // *<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Array => {
                let length = parse_integer(get_line(src)?)?;

                match length {
                    -1 => Ok(Frame::NullArray),
                    length if length < 0 => Err(Error::InvalidLength(length)),
                    _ if depth >= MAX_NESTING_DEPTH => {
                        Err(Error::NestingTooDeep(MAX_NESTING_DEPTH))
                    }
                    length => {
                        let length = length as usize;
                        let mut frames = Vec::with_capacity(length.min(1024));
                        for _ in 0..length {
                            frames.push(Self::parse_nested(src, depth + 1)?);
                        }

                        Ok(Frame::Array(frames))
                    }
                }
            }
            // _\r\n
            DataType::Null => {
                if !get_line(src)?.is_empty() {
                    return Err(Error::InvalidLineEnding);
                }

                Ok(Frame::Null)
            }
            // #<t|f>\r\n
            DataType::Boolean => match get_line(src)? {
                b"t" => Ok(Frame::Boolean(true)),
                b"f" => Ok(Frame::Boolean(false)),
                other => Err(Error::InvalidBoolean(
                    String::from_utf8_lossy(other).into_owned(),
                )),
            },
            // ,<floating-point-number>\r\n
            DataType::Double => {
                let line = get_line(src)?;
                let double = std::str::from_utf8(line)
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok())
                    .ok_or_else(|| {
                        Error::InvalidDouble(String::from_utf8_lossy(line).into_owned())
                    })?;

                Ok(Frame::Double(double))
            }
        }
    }

    /// Appends the wire encoding of the frame to `dst`. Every variant has exactly one encoding.
    pub fn encode(&self, dst: &mut BytesMut) {
        match self {
            Frame::Simple(s) => {
                dst.put_u8(u8::from(DataType::SimpleString));
                dst.put_slice(s.as_bytes());
                dst.put_slice(CRLF);
            }
            Frame::Error(s) => {
                dst.put_u8(u8::from(DataType::SimpleError));
                dst.put_slice(s.as_bytes());
                dst.put_slice(CRLF);
            }
            Frame::Integer(i) => {
                dst.put_u8(u8::from(DataType::Integer));
                dst.put_slice(i.to_string().as_bytes());
                dst.put_slice(CRLF);
            }
            Frame::Bulk(bytes) => {
                dst.put_u8(u8::from(DataType::BulkString));
                dst.put_slice(bytes.len().to_string().as_bytes());
                dst.put_slice(CRLF);
                dst.put_slice(bytes);
                dst.put_slice(CRLF);
            }
            Frame::NullBulkString => dst.put_slice(b"$-1\r\n"),
            Frame::Array(arr) => {
                dst.put_u8(u8::from(DataType::Array));
                dst.put_slice(arr.len().to_string().as_bytes());
                dst.put_slice(CRLF);
                for frame in arr {
                    frame.encode(dst);
                }
            }
            Frame::NullArray => dst.put_slice(b"*-1\r\n"),
            Frame::Null => {
                dst.put_u8(u8::from(DataType::Null));
                dst.put_slice(CRLF);
            }
            Frame::Boolean(b) => {
                dst.put_u8(u8::from(DataType::Boolean));
                dst.put_u8(if *b { b't' } else { b'f' });
                dst.put_slice(CRLF);
            }
            Frame::Double(d) => {
                dst.put_u8(u8::from(DataType::Double));
                dst.put_slice(format_double(*d).as_bytes());
                dst.put_slice(CRLF);
            }
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = BytesMut::new();
        self.encode(&mut bytes);
        bytes.to_vec()
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::NullBulkString => write!(f, "$-1"),
            Frame::Array(arr) => {
                write!(f, "*{}", arr.len())?;
                for frame in arr {
                    write!(f, " {}", frame)?;
                }
                Ok(())
            }
            Frame::NullArray => write!(f, "*-1"),
            Frame::Null => write!(f, "_"),
            Frame::Boolean(b) => write!(f, "#{}", if *b { 't' } else { 'f' }),
            Frame::Double(d) => write!(f, ",{}", format_double(*d)),
        }
    }
}

/// Formats a double the way it travels on the wire: the shortest decimal that parses back to the
/// same value, with `inf`, `-inf` and `nan` for the non-finite cases.
pub fn format_double(d: f64) -> String {
    if d.is_nan() {
        "nan".to_string()
    } else if d.is_infinite() {
        let sign = if d > 0.0 { "" } else { "-" };
        format!("{}inf", sign)
    } else {
        d.to_string()
    }
}

/// Returns the bytes of the current line without its CRLF and moves the cursor past it.
fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let buf: &'a [u8] = src.get_ref();

    let newline = buf
        .get(start..)
        .and_then(|rest| rest.iter().position(|&b| b == b'\n'))
        .map(|index| start + index)
        .ok_or(Error::Incomplete)?;

    if newline == start || buf[newline - 1] != b'\r' {
        return Err(Error::InvalidLineEnding);
    }

    src.set_position((newline + 1) as u64);

    Ok(&buf[start..newline - 1])
}

/// Returns exactly `len` payload bytes followed by a CRLF terminator.
fn get_exact<'a>(src: &mut Cursor<&'a [u8]>, len: usize) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let buf: &'a [u8] = src.get_ref();

    if buf.len().saturating_sub(start) < len.saturating_add(CRLF.len()) {
        return Err(Error::Incomplete);
    }

    let end = start + len;
    if &buf[end..end + CRLF.len()] != CRLF {
        return Err(Error::InvalidLineEnding);
    }

    src.set_position((end + CRLF.len()) as u64);

    Ok(&buf[start..end])
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    let position = src.position() as usize;
    let byte = *src.get_ref().get(position).ok_or(Error::Incomplete)?;
    src.set_position(position as u64 + 1);
    Ok(byte)
}

fn parse_integer(line: &[u8]) -> Result<i64, Error> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| Error::InvalidInteger(String::from_utf8_lossy(line).into_owned()))
}

#[derive(Debug)]
enum DataType {
    SimpleString, // '+'
    SimpleError,  // '-'
    Integer,      // ':'
    BulkString,   // '$'
    Array,        // '*'
    Null,         // '_'
    Boolean,      // '#'
    Double,       // ','
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b':' => Ok(Self::Integer),
            b'$' => Ok(Self::BulkString),
            b'*' => Ok(Self::Array),
            b'_' => Ok(Self::Null),
            b'#' => Ok(Self::Boolean),
            b',' => Ok(Self::Double),
            _ => Err(Error::InvalidDataType(byte as char)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b':',
            DataType::BulkString => b'$',
            DataType::Array => b'*',
            DataType::Null => b'_',
            DataType::Boolean => b'#',
            DataType::Double => b',',
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_src: FromUtf8Error) -> Error {
        Error::InvalidUtf8
    }
}
