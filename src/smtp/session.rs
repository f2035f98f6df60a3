use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use super::{Dialogue, DialogueError, SmtpError, SmtpReply, Stage};
use crate::config::SmtpSettings;

/// Upper bound on continuation lines accepted in a single reply.
const MAX_REPLY_LINES: usize = 128;

/// SMTP client session over any buffered byte stream. Every read and write is
/// bounded by `timeout`.
pub struct SmtpSession<S> {
    stream: S,
    timeout: Duration,
    commands: u32,
}

impl<S> SmtpSession<S>
where
    S: AsyncBufRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, timeout: Duration) -> Self {
        Self {
            stream,
            timeout,
            commands: 0,
        }
    }

    /// Commands sent so far, `QUIT` excluded.
    pub fn commands(&self) -> u32 {
        self.commands
    }

    /// Sends `line` and waits for the reply.
    pub async fn command(&mut self, stage: Stage, line: &str) -> Result<SmtpReply, SmtpError> {
        self.commands += 1;
        tracing::debug!(target: "mailscout::smtp", %stage, command = line, "C:");
        self.write_line(stage, line).await?;
        self.read_reply(stage).await
    }

    pub async fn read_reply(&mut self, stage: Stage) -> Result<SmtpReply, SmtpError> {
        let reply = timeout(self.timeout, self.read_reply_inner(stage))
            .await
            .map_err(|_| SmtpError::Timeout { stage })??;
        tracing::debug!(target: "mailscout::smtp", %stage, code = reply.code, "S: {}", reply.message);
        Ok(reply)
    }

    /// Best-effort `QUIT`; failures are ignored.
    pub async fn quit(&mut self) {
        if self.write_line(Stage::Quit, "QUIT").await.is_ok() {
            let _ = self.read_reply(Stage::Quit).await;
        }
    }

    async fn write_line(&mut self, stage: Stage, line: &str) -> Result<(), SmtpError> {
        let mut data = line.as_bytes().to_vec();
        data.extend_from_slice(b"\r\n");
        let write = async {
            self.stream.write_all(&data).await?;
            self.stream.flush().await
        };
        timeout(self.timeout, write)
            .await
            .map_err(|_| SmtpError::Timeout { stage })?
            .map_err(|err| SmtpError::io(stage, err))
    }

    async fn read_reply_inner(&mut self, stage: Stage) -> Result<SmtpReply, SmtpError> {
        let mut code = None;
        let mut lines = Vec::new();
        loop {
            let mut buf = Vec::new();
            let read = self
                .stream
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|err| SmtpError::io(stage, err))?;
            if read == 0 {
                return Err(SmtpError::io(
                    stage,
                    io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed while reading reply",
                    ),
                ));
            }
            // Servers localize their text in Latin-1 and friends; only the
            // code has to be ASCII.
            let raw = String::from_utf8_lossy(&buf);
            let raw = raw.trim_end_matches(['\r', '\n']);

            let code_part = raw.get(..3).ok_or_else(|| {
                SmtpError::Protocol(format!("invalid SMTP reply: '{raw}'"))
            })?;
            let parsed = code_part.parse::<u16>().map_err(|_| {
                SmtpError::Protocol(format!("invalid SMTP status code: '{code_part}'"))
            })?;
            match code {
                Some(existing) if existing != parsed => {
                    return Err(SmtpError::Protocol(format!(
                        "inconsistent SMTP reply codes: {existing} vs {parsed}"
                    )));
                }
                Some(_) => {}
                None => code = Some(parsed),
            }

            let continuation = raw.as_bytes().get(3) == Some(&b'-');
            lines.push(raw.get(4..).unwrap_or_default().to_string());
            if !continuation {
                break;
            }
            if lines.len() >= MAX_REPLY_LINES {
                return Err(SmtpError::Protocol("SMTP reply too long".into()));
            }
        }
        Ok(SmtpReply {
            code: code.ok_or_else(|| SmtpError::Protocol("SMTP reply missing status code".into()))?,
            message: lines.join("\n"),
        })
    }
}

/// Runs greeting, `EHLO`, `MAIL FROM` and `RCPT TO` for `recipient`.
///
/// Returns the `RCPT TO` reply whatever its code; a refused greeting, `EHLO`
/// or `MAIL FROM` is an [`SmtpError::UnexpectedReply`].
async fn run_dialogue<S>(
    session: &mut SmtpSession<S>,
    settings: &SmtpSettings,
    recipient: &str,
) -> Result<SmtpReply, SmtpError>
where
    S: AsyncBufRead + AsyncWrite + Unpin + Send,
{
    let banner = session.read_reply(Stage::Greeting).await?;
    expect_positive(Stage::Greeting, banner)?;

    let ehlo = session.command(Stage::Ehlo, &settings.helo_command()).await?;
    expect_positive(Stage::Ehlo, ehlo)?;

    let mail = session
        .command(Stage::MailFrom, &settings.mail_from_command())
        .await?;
    expect_positive(Stage::MailFrom, mail)?;

    session
        .command(Stage::RcptTo, &format!("RCPT TO:<{recipient}>"))
        .await
}

fn expect_positive(stage: Stage, reply: SmtpReply) -> Result<(), SmtpError> {
    if reply.is_positive_completion() {
        Ok(())
    } else {
        Err(SmtpError::UnexpectedReply { stage, reply })
    }
}

/// Verifies `recipient` over an already connected `stream` to `host`, then
/// closes the dialogue with `QUIT` when the connection allows it.
pub async fn converse<S>(
    host: &str,
    stream: S,
    settings: &SmtpSettings,
    recipient: &str,
) -> Result<Dialogue, DialogueError>
where
    S: AsyncBufRead + AsyncWrite + Unpin + Send,
{
    let mut session = SmtpSession::new(stream, settings.timeout);
    let outcome = run_dialogue(&mut session, settings, recipient).await;
    let commands = session.commands();
    match outcome {
        Ok(reply) => {
            session.quit().await;
            Ok(Dialogue {
                host: host.to_string(),
                reply,
                commands,
            })
        }
        Err(err) => {
            if err.connection_usable() {
                session.quit().await;
            }
            Err(DialogueError::new(host, commands, err))
        }
    }
}
