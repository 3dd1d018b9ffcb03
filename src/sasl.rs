// ABOUTME: SASL credentials offered in connection.start-ok
// ABOUTME: One variant per supported mechanism, each carrying its own typed fields

use bytes::{BufMut, Bytes, BytesMut};

/// The SASL mechanism and credentials this client offers in response to
/// `connection.start`.
///
/// `PLAIN` is the only mechanism this core implements; a server offering
/// only stronger mechanisms (e.g. `AMQPLAIN`, `EXTERNAL`) is a login failure
/// rather than a fallback — this client never tries to negotiate down to a
/// mechanism the caller didn't ask for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaslCredentials {
    Plain { username: String, password: String },
}

impl SaslCredentials {
    /// The mechanism name this variant negotiates, as it appears in
    /// `connection.start-ok`'s `mechanism` shortstr.
    pub fn mechanism(&self) -> &'static str {
        match self {
            SaslCredentials::Plain { .. } => "PLAIN",
        }
    }

    /// The SASL response blob for `connection.start-ok`.
    ///
    /// PLAIN's wire form is `[authzid] NUL authcid NUL password` (RFC 4616);
    /// this client never sends an authorization identity distinct from the
    /// authentication identity, so the blob starts directly with the NUL.
    pub fn response(&self) -> Bytes {
        match self {
            SaslCredentials::Plain { username, password } => {
                let mut buf = BytesMut::with_capacity(2 + username.len() + password.len());
                buf.put_u8(0);
                buf.extend_from_slice(username.as_bytes());
                buf.put_u8(0);
                buf.extend_from_slice(password.as_bytes());
                buf.freeze()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_response_is_nul_separated() {
        let creds = SaslCredentials::Plain {
            username: "guest".to_string(),
            password: "guest".to_string(),
        };
        assert_eq!(creds.mechanism(), "PLAIN");
        assert_eq!(creds.response().as_ref(), b"\0guest\0guest");
    }
}
