use ascii::{AsAsciiStrError, AsciiString, FromAsciiError};
use core::fmt::{Display, Formatter};
use std::error;
use std::io;
use std::io::{BufRead, Read};
use tokio::io::{AsyncWrite, AsyncWriteExt};

pub type WriteStream = dyn AsyncWrite + Send + Unpin;

/// https://smpp.org/SMPP_v3_4_Issue1_2.pdf section 3.1
///
/// Integer: (1 byte), unsigned.
#[derive(Clone, Debug, PartialEq)]
pub struct Integer1 {
    pub value: u8,
}

impl Integer1 {
    pub fn new(value: u8) -> Self {
        Self { value }
    }

    pub fn read(bytes: &mut dyn BufRead) -> io::Result<Self> {
        let mut ret = [0u8; 1];
        bytes.read_exact(&mut ret)?;
        Ok(Self { value: ret[0] })
    }

    pub async fn write(&self, stream: &mut WriteStream) -> io::Result<()> {
        stream.write_u8(self.value).await
    }
}

/// https://smpp.org/SMPP_v3_4_Issue1_2.pdf section 3.1
///
/// Integer: (4 bytes), unsigned, big endian on the wire.
#[derive(Clone, Debug, PartialEq)]
pub struct Integer4 {
    pub value: u32,
}

impl Integer4 {
    pub fn new(value: u32) -> Self {
        Self { value }
    }

    pub fn read(bytes: &mut dyn BufRead) -> io::Result<Self> {
        let mut ret = [0u8; 4];
        bytes.read_exact(&mut ret)?;
        Ok(Self {
            value: u32::from_be_bytes(ret),
        })
    }

    pub async fn write(&self, stream: &mut WriteStream) -> io::Result<()> {
        stream.write_u32(self.value).await
    }
}

#[derive(Debug)]
pub enum OctetStringCreationError {
    DoesNotEndWithZeroByte,
    NotAscii(AsAsciiStrError),
    TooLong(usize),
    OtherIoError(io::Error),
}

impl Display for OctetStringCreationError {
    fn fmt(
        &self,
        formatter: &mut Formatter,
    ) -> std::result::Result<(), std::fmt::Error> {
        match self {
            OctetStringCreationError::DoesNotEndWithZeroByte => formatter
                .write_str(
                    "C-Octet String does not end with the NULL character.",
                ),
            OctetStringCreationError::NotAscii(e) => write!(
                formatter,
                "Octet String is not ASCII (valid up to byte {}).",
                e.valid_up_to()
            ),
            OctetStringCreationError::TooLong(max_len) => write!(
                formatter,
                "Octet String is too long.  \
                Max length is {}, including final zero byte.",
                max_len
            ),
            OctetStringCreationError::OtherIoError(e) => {
                write!(formatter, "IO error creating Octet String: {}", e)
            }
        }
    }
}

impl error::Error for OctetStringCreationError {}

impl From<io::Error> for OctetStringCreationError {
    fn from(e: io::Error) -> Self {
        OctetStringCreationError::OtherIoError(e)
    }
}

impl From<AsAsciiStrError> for OctetStringCreationError {
    fn from(e: AsAsciiStrError) -> Self {
        OctetStringCreationError::NotAscii(e)
    }
}

impl<Orig> From<FromAsciiError<Orig>> for OctetStringCreationError {
    fn from(e: FromAsciiError<Orig>) -> Self {
        OctetStringCreationError::NotAscii(e.ascii_error())
    }
}

/// https://smpp.org/SMPP_v3_4_Issue1_2.pdf section 3.1
///
/// C-Octet String: ASCII characters terminated with the NULL character.
/// Addresses (source_addr, destination_addr) and system ids travel as these.
#[derive(Clone, Debug, PartialEq)]
pub struct COctetString {
    pub value: AsciiString,
}

impl COctetString {
    pub fn from_bytes(
        value: &[u8],
        max_len: usize,
    ) -> Result<Self, OctetStringCreationError> {
        if value.len() < max_len {
            Ok(Self {
                value: AsciiString::from_ascii(value)?,
            })
        } else {
            Err(OctetStringCreationError::TooLong(max_len))
        }
    }

    pub fn from_str(
        value: &str,
        max_len: usize,
    ) -> Result<Self, OctetStringCreationError> {
        Self::from_bytes(value.as_bytes(), max_len)
    }

    pub fn read(
        bytes: &mut dyn BufRead,
        max_len: usize,
    ) -> Result<Self, OctetStringCreationError> {
        let mut buf = Vec::new();
        let num = bytes.take(max_len as u64).read_until(0x00, &mut buf)?;

        if buf.last() != Some(&0x00) {
            return Err(if num == max_len {
                OctetStringCreationError::TooLong(max_len)
            } else {
                OctetStringCreationError::DoesNotEndWithZeroByte
            });
        }

        COctetString::from_bytes(&buf[..buf.len() - 1], max_len)
    }

    pub async fn write(&self, stream: &mut WriteStream) -> io::Result<()> {
        stream.write_all(self.value.as_bytes()).await?;
        stream.write_u8(0u8).await
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl Display for COctetString {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str(self.value.as_str())
    }
}

/// https://smpp.org/SMPP_v3_4_Issue1_2.pdf section 3.1
///
/// Octet String: raw octets, not NULL terminated.  The short_message
/// carrying UDH + WAP Push user data is one of these.
#[derive(Clone, Debug, PartialEq)]
pub struct OctetString {
    pub value: Vec<u8>,
}

impl OctetString {
    pub fn new(
        value: Vec<u8>,
        max_len: usize,
    ) -> Result<Self, OctetStringCreationError> {
        if value.len() <= max_len {
            Ok(Self { value })
        } else {
            Err(OctetStringCreationError::TooLong(max_len))
        }
    }

    pub fn from_bytes(
        value: &[u8],
        max_len: usize,
    ) -> Result<Self, OctetStringCreationError> {
        Self::new(value.to_vec(), max_len)
    }

    pub fn read(
        bytes: &mut dyn BufRead,
        length: usize,
        max_len: usize,
    ) -> Result<Self, OctetStringCreationError> {
        if length > max_len {
            return Err(OctetStringCreationError::TooLong(length));
        }

        let mut buf = vec![0x00; length];
        bytes.read_exact(buf.as_mut_slice())?;
        OctetString::new(buf, max_len)
    }

    pub async fn write(&self, stream: &mut WriteStream) -> io::Result<()> {
        stream.write_all(self.value.as_slice()).await
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}
