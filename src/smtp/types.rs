use std::fmt;

/// Step of the recipient-verification dialogue.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Greeting,
    Ehlo,
    MailFrom,
    RcptTo,
    Quit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connect => "connect",
            Self::Greeting => "greeting",
            Self::Ehlo => "EHLO",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::Quit => "QUIT",
        };
        f.write_str(name)
    }
}

/// A raw SMTP reply, preserving the numeric status code and message text.
/// Lines of a multi-line reply are joined with `\n`.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

impl fmt::Display for SmtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

/// A dialogue that reached `RCPT TO` and got an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialogue {
    pub host: String,
    /// The `RCPT TO` reply.
    pub reply: SmtpReply,
    /// Commands sent before `QUIT`.
    pub commands: u32,
}

impl Dialogue {
    pub fn accepted(&self) -> bool {
        self.reply.is_positive_completion()
    }
}
