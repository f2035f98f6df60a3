//! Minimal plain-text SMTP client: greeting, `EHLO`, `MAIL FROM`, `RCPT TO`
//! and `QUIT`. No message is ever transmitted.

mod error;
mod exchanger;
mod session;
mod types;

pub use error::{DialogueError, SmtpError};
pub use exchanger::{MailExchanger, SmtpExchanger};
pub use session::{SmtpSession, converse};
pub use types::{Dialogue, SmtpReply, Stage};

#[cfg(test)]
pub(crate) mod tests;
