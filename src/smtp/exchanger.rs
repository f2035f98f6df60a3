use std::future::Future;

use tokio::io::BufStream;
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::{Dialogue, DialogueError, SmtpError, Stage, converse};
use crate::config::SmtpSettings;

/// Runs one recipient-verification dialogue against one mail host.
pub trait MailExchanger: Send + Sync {
    fn verify_recipient(
        &self,
        host: &str,
        recipient: &str,
        settings: &SmtpSettings,
    ) -> impl Future<Output = Result<Dialogue, DialogueError>> + Send;
}

/// [`MailExchanger`] speaking plain SMTP over TCP to `host:settings.port`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpExchanger;

impl MailExchanger for SmtpExchanger {
    async fn verify_recipient(
        &self,
        host: &str,
        recipient: &str,
        settings: &SmtpSettings,
    ) -> Result<Dialogue, DialogueError> {
        let stream = match timeout(settings.timeout, TcpStream::connect((host, settings.port))).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(DialogueError::new(
                    host,
                    0,
                    SmtpError::Connect {
                        host: format!("{host}:{}", settings.port),
                        source,
                    },
                ));
            }
            Err(_) => {
                return Err(DialogueError::new(
                    host,
                    0,
                    SmtpError::Timeout {
                        stage: Stage::Connect,
                    },
                ));
            }
        };
        tracing::debug!(target: "mailscout::smtp", host, port = settings.port, "connected");
        converse(host, BufStream::new(stream), settings, recipient).await
    }
}
