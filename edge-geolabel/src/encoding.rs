use chrono::SecondsFormat;

use super::*;

/// Base58 symbols used for label values.
///
/// Digits and ASCII letters without the look-alikes `0`, `O`, `I` and `l`.
/// Every symbol is valid anywhere inside a label value. Note the order:
/// upper case first, then digits, then lower case. It is not ASCII order, so
/// the lexical order of two encoded values says nothing about the order of
/// their inputs.
pub const LABEL_ALPHABET: &[u8; 58] = b"ABCDEFGHJKLMNPQRSTUVWXYZ123456789abcdefghijkmnopqrstuvwxyz";

static ALPHABET: bs58::Alphabet = bs58::Alphabet::new_unwrap(LABEL_ALPHABET);

#[derive(Debug, thiserror::Error)]
#[error("invalid label encoding: {0}")]
pub struct DecodeError(#[from] bs58::decode::Error);

/// Encode arbitrary bytes into a label-safe string.
///
/// Leading zero bytes are kept (each one becomes a leading `A`), so the
/// encoding is injective and [`decode_text`] recovers the input exactly.
pub fn encode_text(text: impl AsRef<[u8]>) -> String {
    bs58::encode(text.as_ref())
        .with_alphabet(&ALPHABET)
        .into_string()
}

/// Inverse of [`encode_text`].
pub fn decode_text(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    bs58::decode(encoded)
        .with_alphabet(&ALPHABET)
        .into_vec()
        .map_err(DecodeError)
}

/// RFC 3339 with nanoseconds, always 9 fractional digits and a `Z` suffix.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Encode a timestamp as a label value.
///
/// The encoded values do not sort chronologically, decode them with
/// [`decode_text`] before comparing.
pub fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    encode_text(format_timestamp(ts))
}
