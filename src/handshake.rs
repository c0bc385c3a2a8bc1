//! Client-side driver for the token-exchange handshake.
//!
//! Implements the caller contract around
//! [`GssInitiatorContext::process_token`]: announce intent with a
//! `GssHello`, then alternate producing a token, sending it as
//! `GssNegotiationData`, and feeding the server's reply back in, starting
//! from an empty input token, until the context is established or fails.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::context::{GssInitiatorContext, NegotiationStep};
use crate::error::{AuthError, Result};
use crate::protocol::{self, ClientCode, ServerCode};

/// Negotiations longer than this are treated as non-terminating and aborted.
const MAX_ROUNDTRIPS: usize = 5;

/// Run the authentication handshake over a byte stream.
///
/// On success the context reports `is_ready()` and its identity accessors
/// are usable. Any negotiation failure leaves the context failed and is
/// returned to the caller; transport errors surface as
/// [`AuthError::Io`].
pub async fn negotiate<S>(stream: &mut S, context: &mut GssInitiatorContext) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    protocol::write_var_u64(stream, ClientCode::GssHello as u64).await?;
    stream.flush().await?;
    expect_server_hello(stream).await?;

    let mut input = Vec::new();

    for round in 0..MAX_ROUNDTRIPS {
        trace!(round, "processing negotiation round");

        match context.process_token(&input)? {
            NegotiationStep::ContinueNeeded(token) => {
                send_negotiation_data(stream, &token).await?;
                input = receive_negotiation_data(stream).await?;
            }
            NegotiationStep::Established(token) => {
                if !token.is_empty() {
                    send_negotiation_data(stream, &token).await?;
                }
                debug!(rounds = round + 1, "authentication handshake finished");
                return Ok(());
            }
        }
    }

    Err(AuthError::Negotiation(
        "too many authentication round-trips".into(),
    ))
}

async fn expect_server_hello<S>(stream: &mut S) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let code = protocol::read_var_u64(stream).await?;
    match ServerCode::from_u64(code) {
        Some(ServerCode::GssHello) => Ok(()),
        Some(ServerCode::Exception) => Err(read_server_exception(stream).await?),
        _ => Err(AuthError::Negotiation(format!(
            "unexpected packet {code} instead of the server negotiation hello"
        ))),
    }
}

async fn send_negotiation_data<S>(stream: &mut S, token: &[u8]) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    protocol::write_var_u64(stream, ClientCode::GssNegotiationData as u64).await?;
    protocol::write_token(stream, token).await?;
    stream.flush().await?;
    Ok(())
}

async fn receive_negotiation_data<S>(stream: &mut S) -> Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let code = protocol::read_var_u64(stream).await?;
    match ServerCode::from_u64(code) {
        Some(ServerCode::GssNegotiationData) => Ok(protocol::read_token(stream).await?),
        Some(ServerCode::Exception) => Err(read_server_exception(stream).await?),
        _ => Err(AuthError::Negotiation(format!(
            "unexpected packet {code} during the authentication exchange"
        ))),
    }
}

async fn read_server_exception<S>(stream: &mut S) -> Result<AuthError>
where
    S: AsyncRead + Unpin,
{
    let message = protocol::read_token(stream).await?;
    Ok(AuthError::Negotiation(format!(
        "server reported: {}",
        String::from_utf8_lossy(&message)
    )))
}
