use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufStream, DuplexStream, duplex};
use tokio::task::JoinHandle;

use super::*;
use crate::config::SmtpSettings;

type ScriptFn = dyn Fn(&str, &str) -> Result<Dialogue, DialogueError> + Send + Sync;

/// Exchanger answering from a closure over `(host, recipient)`, recording
/// every call and the highest number of calls running at once.
pub(crate) struct ScriptedExchanger {
    script: Box<ScriptFn>,
    delays: HashMap<String, Duration>,
    default_delay: Option<Duration>,
    calls: Mutex<Vec<(String, String)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedExchanger {
    pub(crate) fn new<F>(script: F) -> Self
    where
        F: Fn(&str, &str) -> Result<Dialogue, DialogueError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            delays: HashMap::new(),
            default_delay: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Accepts exactly the listed recipients on every host.
    pub(crate) fn accepting(recipients: &[&str]) -> Self {
        let accepted: Vec<String> = recipients.iter().map(|r| r.to_string()).collect();
        Self::new(move |host, recipient| {
            if accepted.iter().any(|a| a == recipient) {
                Ok(reply(host, 250, "2.1.5 OK"))
            } else {
                Ok(reply(host, 550, "5.1.1 User unknown"))
            }
        })
    }

    pub(crate) fn with_delay(mut self, recipient: &str, delay: Duration) -> Self {
        self.delays.insert(recipient.to_string(), delay);
        self
    }

    /// Every recipient without its own delay answers after `delay`.
    pub(crate) fn slow(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl MailExchanger for ScriptedExchanger {
    async fn verify_recipient(
        &self,
        host: &str,
        recipient: &str,
        _settings: &SmtpSettings,
    ) -> Result<Dialogue, DialogueError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((host.to_string(), recipient.to_string()));
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(recipient).or(self.default_delay.as_ref()) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        (self.script)(host, recipient)
    }
}

/// A completed dialogue whose `RCPT TO` got `code`.
pub(crate) fn reply(host: &str, code: u16, message: &str) -> Dialogue {
    Dialogue {
        host: host.to_string(),
        reply: SmtpReply::new(code, message),
        commands: 3,
    }
}

/// A dialogue that never reached `RCPT TO`.
pub(crate) fn unreachable_host(host: &str) -> DialogueError {
    DialogueError::new(
        host,
        0,
        SmtpError::Timeout {
            stage: Stage::Connect,
        },
    )
}

fn settings() -> SmtpSettings {
    SmtpSettings {
        timeout: Duration::from_millis(500),
        ..SmtpSettings::default()
    }
}

/// Serves `banner`, then answers each received line with the next scripted
/// reply. Returns the lines received.
fn scripted_server(
    server: DuplexStream,
    banner: &'static str,
    replies: Vec<&'static str>,
) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let (read, mut write) = tokio::io::split(server);
        let mut reader = BufReader::new(read);
        let mut received = Vec::new();
        if write.write_all(banner.as_bytes()).await.is_err() {
            return received;
        }
        for reply in replies {
            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) | Err(_) => break,
                Ok(_) => received.push(line.trim_end().to_string()),
            }
            if write.write_all(reply.as_bytes()).await.is_err() {
                break;
            }
        }
        received
    })
}

#[tokio::test]
async fn accepted_recipient_runs_full_dialogue() {
    let (client, server) = duplex(4096);
    let script = scripted_server(
        server,
        "220 mx.example.com ESMTP\r\n",
        vec![
            "250-mx.example.com\r\n250-SIZE 1000000\r\n250 HELP\r\n",
            "250 2.1.0 Sender OK\r\n",
            "250 2.1.5 Recipient OK\r\n",
            "221 Bye\r\n",
        ],
    );

    let dialogue = converse("mx.example.com", BufStream::new(client), &settings(), "a@example.com")
        .await
        .expect("dialogue completes");
    assert!(dialogue.accepted());
    assert_eq!(dialogue.commands, 3);
    assert_eq!(dialogue.reply.to_string(), "250 2.1.5 Recipient OK");

    let received = script.await.expect("server task");
    assert_eq!(
        received,
        [
            "EHLO localhost",
            "MAIL FROM:<noreply@localhost>",
            "RCPT TO:<a@example.com>",
            "QUIT",
        ]
    );
}

#[tokio::test]
async fn rejected_recipient_is_still_a_dialogue() {
    let (client, server) = duplex(4096);
    let _script = scripted_server(
        server,
        "220 ready\r\n",
        vec!["250 hi\r\n", "250 ok\r\n", "550 5.1.1 No such user\r\n", "221 Bye\r\n"],
    );

    let dialogue = converse("mx", BufStream::new(client), &settings(), "nobody@example.com")
        .await
        .expect("dialogue completes");
    assert!(!dialogue.accepted());
    assert_eq!(dialogue.reply.code, 550);
    assert_eq!(dialogue.reply.message, "5.1.1 No such user");
}

#[tokio::test]
async fn refused_sender_stops_before_rcpt() {
    let (client, server) = duplex(4096);
    let script = scripted_server(
        server,
        "220 ready\r\n",
        vec!["250 hi\r\n", "553 sender rejected\r\n", "221 Bye\r\n"],
    );

    let err = converse("mx", BufStream::new(client), &settings(), "a@example.com")
        .await
        .expect_err("MAIL FROM refused");
    assert_eq!(err.commands, 2);
    assert!(matches!(
        err.source,
        SmtpError::UnexpectedReply {
            stage: Stage::MailFrom,
            ..
        }
    ));

    let received = script.await.expect("server task");
    assert_eq!(received.last().map(String::as_str), Some("QUIT"));
}

#[tokio::test]
async fn refused_banner_sends_nothing() {
    let (client, server) = duplex(4096);
    let _script = scripted_server(server, "554 go away\r\n", vec!["221 Bye\r\n"]);

    let err = converse("mx", BufStream::new(client), &settings(), "a@example.com")
        .await
        .expect_err("banner refused");
    assert_eq!(err.commands, 0);
    assert_eq!(err.source.to_string(), "greeting refused: 554 go away");
}

#[tokio::test]
async fn silent_server_times_out() {
    let (client, _server) = duplex(4096);
    let settings = SmtpSettings {
        timeout: Duration::from_millis(30),
        ..SmtpSettings::default()
    };
    let err = converse("mx", BufStream::new(client), &settings, "a@example.com")
        .await
        .expect_err("no banner");
    assert!(matches!(
        err.source,
        SmtpError::Timeout {
            stage: Stage::Greeting
        }
    ));
}

#[tokio::test]
async fn closed_connection_is_io_error() {
    let (client, server) = duplex(4096);
    drop(server);
    let err = converse("mx", BufStream::new(client), &settings(), "a@example.com")
        .await
        .expect_err("eof");
    assert!(matches!(err.source, SmtpError::Io { .. }), "{err:?}");
}

#[tokio::test]
async fn read_reply_rejects_inconsistent_codes() {
    let (client, mut server) = duplex(4096);
    server
        .write_all(b"250-first\r\n251 second\r\n")
        .await
        .expect("write");
    let mut session = SmtpSession::new(BufStream::new(client), Duration::from_secs(1));
    let err = session.read_reply(Stage::Ehlo).await.expect_err("mismatch");
    assert!(matches!(err, SmtpError::Protocol(_)));
}

#[tokio::test]
async fn read_reply_rejects_garbage() {
    let (client, mut server) = duplex(4096);
    server.write_all(b"hello there\r\n").await.expect("write");
    let mut session = SmtpSession::new(BufStream::new(client), Duration::from_secs(1));
    let err = session.read_reply(Stage::Greeting).await.expect_err("garbage");
    assert!(err.to_string().contains("invalid SMTP status code"));
}

#[tokio::test]
async fn read_reply_joins_multiline_text() {
    let (client, mut server) = duplex(4096);
    server
        .write_all(b"250-mx.example.com\r\n250-PIPELINING\r\n250 8BITMIME\r\n")
        .await
        .expect("write");
    let mut session = SmtpSession::new(BufStream::new(client), Duration::from_secs(1));
    let reply = session.read_reply(Stage::Ehlo).await.expect("reply");
    assert_eq!(reply.code, 250);
    assert_eq!(reply.message, "mx.example.com\nPIPELINING\n8BITMIME");
}

#[tokio::test]
async fn read_reply_tolerates_latin1_text() {
    let (client, mut server) = duplex(4096);
    server
        .write_all(b"550 5.1.1 Destinataire inconnu \xe0 cette adresse\r\n")
        .await
        .expect("write");
    let mut session = SmtpSession::new(BufStream::new(client), Duration::from_secs(1));
    let reply = session.read_reply(Stage::RcptTo).await.expect("reply");
    assert_eq!(reply.code, 550);
    assert!(reply.message.starts_with("5.1.1 Destinataire inconnu "), "{reply:?}");
    assert!(reply.message.ends_with(" cette adresse"), "{reply:?}");
}

#[tokio::test]
async fn latin1_rcpt_rejection_completes_the_dialogue() {
    let (client, mut server) = duplex(4096);
    // Every reply is queued up front; the session reads them one per command.
    server
        .write_all(b"220 ready\r\n250 hi\r\n250 ok\r\n550 Bo\xeete inconnue\r\n221 Bye\r\n")
        .await
        .expect("write");

    let dialogue = converse("mx", BufStream::new(client), &settings(), "nobody@example.com")
        .await
        .expect("dialogue completes");
    assert!(!dialogue.accepted());
    assert_eq!(dialogue.reply.code, 550);
    assert_eq!(dialogue.commands, 3);
}

#[test]
fn reply_classes() {
    assert!(SmtpReply::new(250, "ok").is_positive_completion());
    assert!(!SmtpReply::new(451, "later").is_positive_completion());
    assert!(!SmtpReply::new(550, "no").is_positive_completion());
}

#[test]
fn empty_sender_uses_null_reverse_path() {
    let settings = SmtpSettings {
        mail_from: String::new(),
        ..SmtpSettings::default()
    };
    assert_eq!(settings.mail_from_command(), "MAIL FROM:<>");
}
