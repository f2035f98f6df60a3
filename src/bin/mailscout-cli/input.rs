use std::io::Read;

use anyhow::{Context, Result, bail};
use mailscout::{BulkRequest, NameInput};

/// Reads bulk requests from `path`, or stdin when absent.
pub fn read_requests(path: Option<&str>) -> Result<Vec<BulkRequest>> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("lecture de {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("lecture de stdin")?;
            buf
        }
    };
    parse_requests(&text)
}

/// A JSON array of `{"domain", "names"}` objects, or one request per line:
/// `domain[,First Last[;Other Person]]`. Blank lines and `#` comments are
/// skipped.
pub fn parse_requests(text: &str) -> Result<Vec<BulkRequest>> {
    if text.trim_start().starts_with('[') {
        return parse_json(text);
    }
    let mut requests = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (domain, names) = line.split_once(',').unwrap_or((line, ""));
        let domain = domain.trim();
        if domain.is_empty() {
            bail!("ligne {}: domaine manquant", idx + 1);
        }
        requests.push(BulkRequest::new(domain, parse_names(names)));
    }
    Ok(requests)
}

fn parse_names(field: &str) -> NameInput {
    let people: Vec<&str> = field
        .split(';')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    match people.as_slice() {
        [] => NameInput::default(),
        [single] => NameInput::Full(single.to_string()),
        many => NameInput::People(
            many.iter()
                .map(|name| name.split_whitespace().map(str::to_string).collect())
                .collect(),
        ),
    }
}

#[cfg(feature = "with-serde")]
fn parse_json(text: &str) -> Result<Vec<BulkRequest>> {
    serde_json::from_str(text).context("entrée JSON invalide")
}

#[cfg(not(feature = "with-serde"))]
fn parse_json(_: &str) -> Result<Vec<BulkRequest>> {
    bail!("entrée JSON nécessite la feature 'with-serde'")
}
