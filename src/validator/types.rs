#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub ok: bool,
    pub reasons: Vec<String>,
    /// Local part as written (empty when the address has no single '@').
    pub local: String,
    /// Domain converted to lower-case ASCII (IDNA), empty when conversion failed.
    pub ascii_domain: String,
}
