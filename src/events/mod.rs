//! Notifications for external observers
//!
//! The pipeline reports what it does through [`SitemapEvent`]s sent over an
//! unbounded tokio channel. Sending never blocks, and a missing or dropped
//! receiver never changes the outcome of an operation.

use reqwest::StatusCode;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Events emitted while a sitemap is assembled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapEvent {
    /// A page was accepted into the sitemap
    Add { url: String },

    /// A page was left out (noindex, AMP, canonicalized, robots.txt)
    Ignore { url: String },

    /// A recoverable problem, such as an unparseable last-modified date
    Warning { url: String, message: String },

    /// A fetch failed; `code` follows HTTP status semantics
    Error {
        code: u16,
        message: String,
        url: String,
    },

    /// The sitemap has been assembled and promoted
    Done,
}

/// Sending half of the notification channel
///
/// Cloning a notifier is cheap; every clone feeds the same receiver.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    sender: Option<UnboundedSender<SitemapEvent>>,
}

impl Notifier {
    /// Creates a notifier feeding `sender`
    pub fn new(sender: UnboundedSender<SitemapEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// Creates a notifier together with the receiver for its events
    pub fn channel() -> (Self, UnboundedReceiver<SitemapEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self::new(sender), receiver)
    }

    /// Creates a notifier that discards every event
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn add(&self, url: &str) {
        self.emit(SitemapEvent::Add {
            url: url.to_string(),
        });
    }

    pub fn ignore(&self, url: &str) {
        self.emit(SitemapEvent::Ignore {
            url: url.to_string(),
        });
    }

    pub fn warning(&self, url: &str, message: impl Into<String>) {
        self.emit(SitemapEvent::Warning {
            url: url.to_string(),
            message: message.into(),
        });
    }

    /// Reports a failed fetch using the canonical reason phrase of `code`
    pub fn error(&self, code: u16, url: &str) {
        let message = StatusCode::from_u16(code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown Error")
            .to_string();
        self.error_with_message(code, message, url);
    }

    /// Reports a failed fetch with an explicit message
    pub fn error_with_message(&self, code: u16, message: impl Into<String>, url: &str) {
        self.emit(SitemapEvent::Error {
            code,
            message: message.into(),
            url: url.to_string(),
        });
    }

    pub fn done(&self) {
        self.emit(SitemapEvent::Done);
    }

    fn emit(&self, event: SitemapEvent) {
        if let Some(sender) = &self.sender {
            if sender.send(event).is_err() {
                tracing::trace!("Notification receiver dropped, event discarded");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_arrive_in_order() {
        let (notifier, mut rx) = Notifier::channel();
        notifier.add("http://foo.bar/");
        notifier.ignore("http://foo.bar/amp");
        notifier.done();

        assert_eq!(
            rx.try_recv().unwrap(),
            SitemapEvent::Add {
                url: "http://foo.bar/".to_string()
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SitemapEvent::Ignore {
                url: "http://foo.bar/amp".to_string()
            }
        );
        assert_eq!(rx.try_recv().unwrap(), SitemapEvent::Done);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_error_uses_reason_phrase() {
        let (notifier, mut rx) = Notifier::channel();
        notifier.error(404, "http://foo.bar/missing");

        assert_eq!(
            rx.try_recv().unwrap(),
            SitemapEvent::Error {
                code: 404,
                message: "Not Found".to_string(),
                url: "http://foo.bar/missing".to_string(),
            }
        );
    }

    #[test]
    fn test_timeout_code() {
        let (notifier, mut rx) = Notifier::channel();
        notifier.error(408, "http://foo.bar/slow");

        match rx.try_recv().unwrap() {
            SitemapEvent::Error { code, message, .. } => {
                assert_eq!(code, 408);
                assert_eq!(message, "Request Timeout");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_dropped_receiver_is_harmless() {
        let (notifier, rx) = Notifier::channel();
        drop(rx);
        notifier.add("http://foo.bar/");
        notifier.done();
    }

    #[test]
    fn test_disabled_notifier() {
        let notifier = Notifier::disabled();
        notifier.warning("http://foo.bar/", "nothing listens");
    }
}
