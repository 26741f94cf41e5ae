//! Cleartext signature envelope.
//!
//! The envelope keeps the signed text readable and recoverable byte for byte:
//!
//! ```text
//! -----BEGIN CHARTSEAL SIGNED MESSAGE-----
//! Algorithm: ed25519
//! Key: 3b6a27bcceb6a42d
//!
//! <dash-escaped text>
//! -----BEGIN CHARTSEAL SIGNATURE-----
//! <base64 signature>
//! -----END CHARTSEAL SIGNATURE-----
//! ```
//!
//! Text lines that start with `-` are prefixed with `"- "` so they can never be
//! mistaken for an armor line. The prefix is removed again by [`Envelope::parse`].
//!
//! Line endings are canonical `\n`. Parsing converts `\r\n` first, so an
//! envelope that went through a CRLF conversion still yields the signed text.

use crate::SignerError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt::Write as _;

pub const MESSAGE_BEGIN: &str = "-----BEGIN CHARTSEAL SIGNED MESSAGE-----";
pub const SIGNATURE_BEGIN: &str = "-----BEGIN CHARTSEAL SIGNATURE-----";
pub const SIGNATURE_END: &str = "-----END CHARTSEAL SIGNATURE-----";

const ALGORITHM_HEADER: &str = "Algorithm";
const KEY_HEADER: &str = "Key";
const BASE64_COLUMNS: usize = 64;

/// A parsed or about-to-be-armored signed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Signature algorithm name, e.g. `ed25519`.
    pub algorithm: String,
    /// Short hex hint identifying the signing key.
    pub key_id: String,
    /// The signed text, unescaped.
    pub text: String,
    /// Raw signature bytes.
    pub signature: Vec<u8>,
}

impl Envelope {
    /// Render the envelope as armored text.
    pub fn armor(&self) -> String {
        let mut out = String::with_capacity(self.text.len() + 256);
        let _ = writeln!(out, "{MESSAGE_BEGIN}");
        let _ = writeln!(out, "{ALGORITHM_HEADER}: {}", self.algorithm);
        let _ = writeln!(out, "{KEY_HEADER}: {}", self.key_id);
        out.push('\n');
        out.push_str(&dash_escape(&self.text));
        out.push('\n');
        let _ = writeln!(out, "{SIGNATURE_BEGIN}");

        let encoded = STANDARD.encode(&self.signature);
        // base64 output is ASCII, so byte chunks are valid str slices
        for chunk in encoded.as_bytes().chunks(BASE64_COLUMNS) {
            out.push_str(&String::from_utf8_lossy(chunk));
            out.push('\n');
        }
        let _ = writeln!(out, "{SIGNATURE_END}");
        out
    }

    /// Parse armored text back into its parts.
    pub fn parse(armored: &str) -> Result<Self, SignerError> {
        let armored = armored.replace("\r\n", "\n");
        let rest = armored
            .strip_prefix(MESSAGE_BEGIN)
            .and_then(|r| r.strip_prefix('\n'))
            .ok_or_else(|| malformed("missing message header line"))?;

        let (headers, rest) = rest
            .split_once("\n\n")
            .ok_or_else(|| malformed("missing blank line after headers"))?;

        let mut algorithm = None;
        let mut key_id = None;
        for line in headers.lines() {
            let (name, value) = line
                .split_once(": ")
                .ok_or_else(|| malformed(format!("invalid header line {line:?}")))?;
            match name {
                ALGORITHM_HEADER => algorithm = Some(value.to_string()),
                KEY_HEADER => key_id = Some(value.to_string()),
                _ => {}
            }
        }

        let marker = format!("\n{SIGNATURE_BEGIN}\n");
        let split = rest
            .rfind(&marker)
            .ok_or_else(|| malformed("missing signature block"))?;
        let text = dash_unescape(&rest[..split])?;
        let signature = decode_signature_block(&rest[split + marker.len()..])?;

        Ok(Envelope {
            algorithm: algorithm.ok_or_else(|| malformed("missing Algorithm header"))?,
            key_id: key_id.ok_or_else(|| malformed("missing Key header"))?,
            text,
            signature,
        })
    }
}

fn decode_signature_block(block: &str) -> Result<Vec<u8>, SignerError> {
    let (body, trailer) = block
        .split_once(SIGNATURE_END)
        .ok_or_else(|| malformed("missing signature end line"))?;
    if !trailer.trim().is_empty() {
        return Err(malformed("unexpected data after signature block"));
    }
    let encoded: String = body.lines().map(str::trim).collect();
    STANDARD
        .decode(encoded.as_bytes())
        .map_err(|err| malformed(format!("invalid signature encoding: {err}")))
}

fn dash_escape(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.starts_with('-') {
                format!("- {line}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn dash_unescape(body: &str) -> Result<String, SignerError> {
    let mut lines = Vec::new();
    for line in body.split('\n') {
        if let Some(stripped) = line.strip_prefix("- ") {
            lines.push(stripped);
        } else if line.starts_with('-') {
            return Err(malformed(format!("unescaped dash line {line:?}")));
        } else {
            lines.push(line);
        }
    }
    Ok(lines.join("\n"))
}

fn malformed(reason: impl Into<String>) -> SignerError {
    SignerError::Envelope(reason.into())
}
