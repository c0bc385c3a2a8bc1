//! Wire-protocol packet codes and token framing for the handshake.
//!
//! Only the packet kinds that participate in the authentication handshake
//! are modelled here; query execution, data blocks and compression belong to
//! the surrounding client. Packets start with a variable-length unsigned
//! code; negotiation payloads are length-prefixed opaque byte strings.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a single negotiation token.
///
/// Kerberos service tickets with large PACs stay well under this; anything
/// bigger is a framing error, not a token.
pub const MAX_TOKEN_SIZE: u64 = 1 << 20;

const MAX_VAR_UINT_BYTES: usize = 10;

/// Packet codes sent by the client during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum ClientCode {
    /// Name, version, default database name.
    Hello = 0,
    /// Announces intent to authenticate via GSS negotiation.
    GssHello = 11,
    /// Outbound negotiation token.
    GssNegotiationData = 12,
}

/// Packet codes received from the server during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum ServerCode {
    /// Name, version, revision.
    Hello = 0,
    /// Server-side error report.
    Exception = 2,
    /// Server's intent-to-negotiate signal.
    GssHello = 16,
    /// Inbound negotiation token.
    GssNegotiationData = 17,
}

impl ServerCode {
    /// Decode a received packet code; unknown codes yield `None`.
    pub fn from_u64(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Hello),
            2 => Some(Self::Exception),
            16 => Some(Self::GssHello),
            17 => Some(Self::GssNegotiationData),
            _ => None,
        }
    }
}

/// Write a LEB128 variable-length unsigned integer.
pub async fn write_var_u64<W>(writer: &mut W, mut value: u64) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        writer.write_all(&[byte]).await?;
        if value == 0 {
            return Ok(());
        }
    }
}

/// Read a LEB128 variable-length unsigned integer.
pub async fn read_var_u64<R>(reader: &mut R) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut value = 0u64;
    for index in 0..MAX_VAR_UINT_BYTES {
        let byte = reader.read_u8().await?;
        // The tenth byte may only carry the final bit of a u64.
        if index == MAX_VAR_UINT_BYTES - 1 && byte & 0xfe != 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "variable-length integer overflows 64 bits",
            ));
        }
        value |= u64::from(byte & 0x7f) << (index * 7);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        "variable-length integer is too long",
    ))
}

/// Write a length-prefixed opaque token.
pub async fn write_token<W>(writer: &mut W, token: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    write_var_u64(writer, token.len() as u64).await?;
    writer.write_all(token).await
}

/// Read a length-prefixed opaque token, bounded by [`MAX_TOKEN_SIZE`].
pub async fn read_token<R>(reader: &mut R) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let length = read_var_u64(reader).await?;
    if length > MAX_TOKEN_SIZE {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("negotiation token of {length} bytes exceeds the limit"),
        ));
    }

    let mut token = vec![0u8; length as usize];
    reader.read_exact(&mut token).await?;
    Ok(token)
}
