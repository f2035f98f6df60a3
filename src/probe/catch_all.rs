use rand::Rng;

use crate::config::SmtpSettings;
use crate::smtp::MailExchanger;

const PROBE_LOCAL_LEN: usize = 12;

/// Random lower-case local part that is, statistically, never a real mailbox.
pub(crate) fn random_local_part() -> String {
    let mut rng = rand::thread_rng();
    (0..PROBE_LOCAL_LEN)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

/// Asks `mx_host` alone whether it accepts a made-up recipient at `domain`.
/// Any failure counts as "not catch-all".
pub async fn is_catch_all<X: MailExchanger>(
    exchanger: &X,
    domain: &str,
    mx_host: &str,
    settings: &SmtpSettings,
) -> bool {
    let probe = format!("{}@{domain}", random_local_part());
    match exchanger.verify_recipient(mx_host, &probe, settings).await {
        Ok(dialogue) => {
            tracing::debug!(
                target: "mailscout::probe",
                mx = mx_host,
                reply = %dialogue.reply,
                "catch-all check answered"
            );
            dialogue.accepted()
        }
        Err(err) => {
            tracing::debug!(target: "mailscout::probe", mx = mx_host, error = %err, "catch-all check failed");
            false
        }
    }
}
