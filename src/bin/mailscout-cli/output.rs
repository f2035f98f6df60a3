use anyhow::{Context, Result, bail};
use mailscout::{BulkResult, NameInput, ProbeStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    Json,
    Ndjson,
    Csv,
}

impl Format {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "human" => Ok(Self::Human),
            #[cfg(feature = "with-serde")]
            "json" => Ok(Self::Json),
            #[cfg(feature = "with-serde")]
            "ndjson" => Ok(Self::Ndjson),
            #[cfg(feature = "with-csv")]
            "csv" => Ok(Self::Csv),
            #[cfg(not(feature = "with-serde"))]
            "json" | "ndjson" => bail!("format={s} nécessite la feature 'with-serde'"),
            #[cfg(not(feature = "with-csv"))]
            "csv" => bail!("format=csv nécessite la feature 'with-csv'"),
            other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
        }
    }

    /// Line-oriented formats are printed as results arrive.
    fn streams(self) -> bool {
        matches!(self, Self::Human | Self::Ndjson)
    }
}

/// Where reports go: stdout, or a file written once at the end.
pub struct Sink {
    format: Format,
    out: Option<String>,
}

impl Sink {
    pub fn new(format: &str, out: Option<&str>) -> Result<Self> {
        Ok(Self {
            format: Format::parse(format)?,
            out: out.map(str::to_string),
        })
    }

    /// Emits `row` immediately when printing a line format to stdout.
    pub fn progress(&self, row: &BulkResult) -> Result<()> {
        if self.out.is_none() && self.format.streams() {
            print!("{}", render(self.format, std::slice::from_ref(row))?);
        }
        Ok(())
    }

    /// Writes whatever [`Sink::progress`] did not.
    pub fn finish(&self, rows: &[BulkResult]) -> Result<()> {
        match &self.out {
            Some(path) => write_all_atomically(path, render(self.format, rows)?.as_bytes()),
            None if self.format.streams() => Ok(()),
            None => {
                print!("{}", render(self.format, rows)?);
                Ok(())
            }
        }
    }
}

/// `true` when every row found an address.
pub fn all_found(rows: &[BulkResult]) -> bool {
    rows.iter().all(|row| row.result.is_found())
}

fn render(format: Format, rows: &[BulkResult]) -> Result<String> {
    match format {
        Format::Human => Ok(rows.iter().map(human_lines).collect()),
        Format::Json => render_json(rows),
        Format::Ndjson => render_ndjson(rows),
        Format::Csv => render_csv(rows),
    }
}

fn human_lines(row: &BulkResult) -> String {
    let result = &row.result;
    let tag = match result.status {
        ProbeStatus::Valid => "[VALID]  ",
        ProbeStatus::Risky => "[RISKY]  ",
        ProbeStatus::Invalid => "[INVALID]",
    };
    let email = result.email.as_deref().unwrap_or("-");
    let mut out = format!("{tag} {email} ({}) :: {}\n", row.domain, result.message);
    let people = names_field(&row.names);
    if !people.is_empty() {
        out.push_str(&format!("          names: {people}\n"));
    }
    out.push_str(&format!(
        "          mx={} connections={} ops={} elapsed={:.3}s\n",
        if result.mx.is_empty() { "-" } else { result.mx.as_str() },
        result.connections,
        result.verification_ops,
        result.elapsed_seconds,
    ));
    out
}

/// People joined by `;`, tokens by spaces.
fn names_field(names: &NameInput) -> String {
    names
        .people()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(feature = "with-serde")]
fn render_json(rows: &[BulkResult]) -> Result<String> {
    let mut s = serde_json::to_string_pretty(rows)?;
    s.push('\n');
    Ok(s)
}

#[cfg(not(feature = "with-serde"))]
fn render_json(_: &[BulkResult]) -> Result<String> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn render_ndjson(rows: &[BulkResult]) -> Result<String> {
    let mut buf = String::new();
    for row in rows {
        buf.push_str(&serde_json::to_string(row)?);
        buf.push('\n');
    }
    Ok(buf)
}

#[cfg(not(feature = "with-serde"))]
fn render_ndjson(_: &[BulkResult]) -> Result<String> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-csv")]
fn render_csv(rows: &[BulkResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "domain",
        "names",
        "email",
        "status",
        "catch_all",
        "message",
        "user_name",
        "mx",
        "connections",
        "verification_ops",
        "elapsed_seconds",
    ])?;
    for row in rows {
        let result = &row.result;
        wtr.write_record([
            row.domain.clone(),
            names_field(&row.names),
            result.email.clone().unwrap_or_default(),
            result.status.to_string(),
            result.catch_all.to_string(),
            result.message.clone(),
            result.user_name.clone(),
            result.mx.clone(),
            result.connections.to_string(),
            result.verification_ops.to_string(),
            format!("{:.3}", result.elapsed_seconds),
        ])?;
    }
    let data = wtr.into_inner().context("flush CSV")?;
    String::from_utf8(data).context("CSV non UTF-8")
}

#[cfg(not(feature = "with-csv"))]
fn render_csv(_: &[BulkResult]) -> Result<String> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
