//! Transport error classification.
//!
//! # Responsibilities
//! - Map a `reqwest::Error` to a single `ErrorKind`
//! - Keep the probe/scheduler boundary free of raw exception text
//!
//! # Design Decisions
//! - Walk the full `source()` chain; the interesting cause (io error,
//!   resolver failure, TLS alert) is usually two or three levels down
//! - Message inspection is a last resort, used where the cause type is
//!   private to hyper-util or the TLS backend

use std::error::Error;
use std::io;

use crate::probe::types::ErrorKind;

/// Classify a failed request into the probe error taxonomy.
pub fn classify_request_error(err: &reqwest::Error) -> ErrorKind {
    if err.is_timeout() {
        return ErrorKind::Timeout;
    }
    if err.is_decode() {
        return ErrorKind::MalformedResponse;
    }
    if let Some(kind) = classify_cause_chain(err) {
        return kind;
    }
    if err.is_connect() {
        // Connect failure with no recognizable cause; refused is the
        // closest category in the taxonomy.
        return ErrorKind::ConnectionRefused;
    }
    ErrorKind::Internal
}

/// Walk the cause chain looking for a recognizable transport failure.
fn classify_cause_chain(err: &(dyn Error + 'static)) -> Option<ErrorKind> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::ConnectionRefused => return Some(ErrorKind::ConnectionRefused),
                io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                    return Some(ErrorKind::ConnectionRefused)
                }
                io::ErrorKind::TimedOut => return Some(ErrorKind::Timeout),
                _ => {}
            }
        }

        let text = cause.to_string();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return Some(ErrorKind::DnsFailure);
        }
        if text.contains("certificate") || text.contains("handshake") || text.contains("tls") {
            return Some(ErrorKind::TlsFailure);
        }

        source = cause.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    /// Stand-in for the layered errors reqwest/hyper-util produce.
    #[derive(Debug)]
    struct Layered {
        message: &'static str,
        source: Option<Box<dyn Error + Send + Sync>>,
    }

    impl Layered {
        fn new(message: &'static str) -> Self {
            Self {
                message,
                source: None,
            }
        }

        fn wrapping(message: &'static str, inner: Layered) -> Self {
            Self {
                message,
                source: Some(Box::new(inner)),
            }
        }
    }

    impl fmt::Display for Layered {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl Error for Layered {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.source
                .as_deref()
                .map(|source| source as &(dyn Error + 'static))
        }
    }

    #[derive(Debug)]
    struct IoWrapper(io::Error);

    impl fmt::Display for IoWrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "client error (Connect)")
        }
    }

    impl Error for IoWrapper {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn refused_io_error_in_the_chain_wins() {
        let err = IoWrapper(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert_eq!(
            classify_cause_chain(&err),
            Some(ErrorKind::ConnectionRefused)
        );
    }

    #[test]
    fn certificate_message_is_a_tls_failure() {
        let err = Layered::wrapping(
            "client error (Connect)",
            Layered::new("invalid peer certificate: UnknownIssuer"),
        );
        assert_eq!(classify_cause_chain(&err), Some(ErrorKind::TlsFailure));
    }

    #[test]
    fn handshake_message_is_a_tls_failure() {
        let err = Layered::wrapping(
            "client error (Connect)",
            Layered::new("tls handshake eof"),
        );
        assert_eq!(classify_cause_chain(&err), Some(ErrorKind::TlsFailure));
    }

    #[test]
    fn resolver_message_is_a_dns_failure() {
        let err = Layered::wrapping(
            "client error (Connect)",
            Layered::wrapping(
                "dns error",
                Layered::new("failed to lookup address information: Name or service not known"),
            ),
        );
        assert_eq!(classify_cause_chain(&err), Some(ErrorKind::DnsFailure));
    }

    #[test]
    fn unrecognized_chains_classify_as_nothing() {
        let err = Layered::wrapping("client error (SendRequest)", Layered::new("broken pipe"));
        assert_eq!(classify_cause_chain(&err), None);
    }
}
