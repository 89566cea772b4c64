//! Fetch-then-seal client.
//!
//! Glue between the external collaborators and the envelope core:
//! 1. Ask the reachability capability whether to try at all
//! 2. Fetch the complete response through the fetch capability
//! 3. Seal the body into an envelope
//! 4. Append the exchange to the journal
//!
//! The cipher only ever sees fully delivered response bytes.

use std::fmt;

use chrono::Utc;

use crate::crypter::Crypter;
use crate::envelope::{Envelope, EnvelopeCipher};
use crate::error::CipherError;
use crate::fetch::{Fetch, FetchRequest, ResponseMeta, TransportError};
use crate::journal::{ExchangeOutcome, ExchangeRecord, ExchangeSink, Journal};
use crate::reachability::Reachability;

/// Why a client request produced no envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The reachability check failed; nothing was fetched.
    Unreachable,
    /// The fetch capability reported a failure.
    Transport(TransportError),
    /// The fetch capability returned neither a body nor an error.
    MissingBody,
    /// The body could not be sealed or the envelope could not be opened.
    Cipher(CipherError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "network unreachable"),
            Self::Transport(err) => write!(f, "transport error: {}", err),
            Self::MissingBody => write!(f, "response carried no body"),
            Self::Cipher(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Cipher(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CipherError> for ClientError {
    fn from(err: CipherError) -> Self {
        Self::Cipher(err)
    }
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

/// What the caller gets back for one request.
///
/// Metadata is passed through whenever a response arrived, even if sealing
/// failed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedResponse {
    pub error: Option<ClientError>,
    pub metadata: Option<ResponseMeta>,
    pub envelope: Option<Envelope>,
}

impl SealedResponse {
    fn failed(error: ClientError, metadata: Option<ResponseMeta>) -> Self {
        Self {
            error: Some(error),
            metadata,
            envelope: None,
        }
    }

    /// Collapse into a `Result`, dropping the metadata.
    pub fn into_result(self) -> Result<Envelope, ClientError> {
        match (self.error, self.envelope) {
            (Some(err), _) => Err(err),
            (None, Some(envelope)) => Ok(envelope),
            (None, None) => Err(ClientError::MissingBody),
        }
    }
}

/// Fetches responses and hands them back sealed under the client's key.
pub struct EncryptedClient<F, R> {
    fetcher: F,
    reachability: R,
    cipher: EnvelopeCipher,
    journal: Journal,
}

impl<F, R> EncryptedClient<F, R>
where
    F: Fetch,
    R: Reachability,
{
    pub fn new(fetcher: F, reachability: R, cipher: EnvelopeCipher) -> Self {
        Self::with_journal(fetcher, reachability, cipher, Journal::new())
    }

    /// Like [`EncryptedClient::new`], recording into a caller-configured journal.
    pub fn with_journal(fetcher: F, reachability: R, cipher: EnvelopeCipher, journal: Journal) -> Self {
        Self {
            fetcher,
            reachability,
            cipher,
            journal,
        }
    }

    /// Forward every exchange record to `sink` as well as the in-memory journal.
    pub fn add_journal_sink(&mut self, sink: Box<dyn ExchangeSink>) {
        self.journal.add_forward_sink(sink);
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Take the retained exchange records, oldest first.
    pub fn drain_journal(&mut self) -> Vec<ExchangeRecord> {
        self.journal.drain()
    }

    /// Drop the retained exchange records.
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    pub fn cipher(&self) -> &EnvelopeCipher {
        &self.cipher
    }

    /// Fetch `request` and seal the response body.
    pub fn request(&mut self, request: &FetchRequest) -> SealedResponse {
        let response = self.exchange(request);

        let outcome = match &response.error {
            None => ExchangeOutcome::Sealed,
            Some(err) => ExchangeOutcome::Failed(err.to_string()),
        };
        self.journal.append(ExchangeRecord {
            method: request.method,
            url: request.url.clone(),
            status: response.metadata.as_ref().map(|meta| meta.status),
            envelope_len: response.envelope.as_ref().map(Envelope::len),
            outcome,
            timestamp: Utc::now(),
        });

        response
    }

    /// Decrypt the envelope of a previous response.
    pub fn open(&self, response: &SealedResponse) -> Result<Vec<u8>, ClientError> {
        let envelope = response.envelope.as_ref().ok_or(ClientError::MissingBody)?;
        Ok(self.cipher.open(envelope.as_bytes())?)
    }

    fn exchange(&self, request: &FetchRequest) -> SealedResponse {
        if !self.reachability.is_reachable() {
            tracing::debug!(url = %request.url, "skipping fetch, network unreachable");
            return SealedResponse::failed(ClientError::Unreachable, None);
        }

        let outcome = self.fetcher.fetch(request);
        if let Some(err) = outcome.error {
            tracing::warn!(url = %request.url, error = %err, "fetch failed");
            return SealedResponse::failed(err.into(), outcome.metadata);
        }
        let Some(body) = outcome.body else {
            return SealedResponse::failed(ClientError::MissingBody, outcome.metadata);
        };

        match self.cipher.seal(&body) {
            Ok(envelope) => {
                tracing::debug!(
                    url = %request.url,
                    body_len = body.len(),
                    envelope_len = envelope.len(),
                    "sealed response"
                );
                SealedResponse {
                    error: None,
                    metadata: outcome.metadata,
                    envelope: Some(envelope),
                }
            }
            Err(err) => SealedResponse::failed(err.into(), outcome.metadata),
        }
    }
}

impl<F, R> fmt::Debug for EncryptedClient<F, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedClient")
            .field("cipher", &self.cipher)
            .field("journal", &self.journal)
            .finish_non_exhaustive()
    }
}
