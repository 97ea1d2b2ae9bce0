//! JSON Export
//!
//! Writes the visible certificates to a JSON file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::Certificate;
use crate::ui::format::format_iso_date;

/// Exportable certificate with a readable issue date alongside the raw timestamp
#[derive(Serialize)]
struct ExportableCertificate<'a> {
    token_id: u64,
    name: &'a str,
    program: &'a str,
    grade: &'a str,
    year: u64,
    issued_at: u64,
    issued: String,
    owner: &'a str,
    is_owner: bool,
    token_uri: &'a str,
}

impl<'a> From<&'a Certificate> for ExportableCertificate<'a> {
    fn from(cert: &'a Certificate) -> Self {
        Self {
            token_id: cert.token_id,
            name: &cert.name,
            program: &cert.program,
            grade: &cert.grade,
            year: cert.year,
            issued_at: cert.issued_at,
            issued: format_iso_date(cert.issued_at),
            owner: &cert.owner,
            is_owner: cert.is_owner,
            token_uri: &cert.token_uri,
        }
    }
}

/// Write certificates to a JSON file
pub fn write_certificates(
    path: &Path,
    certificates: &[&Certificate],
) -> Result<usize, Box<dyn std::error::Error>> {
    let exportable: Vec<ExportableCertificate> =
        certificates.iter().map(|c| ExportableCertificate::from(*c)).collect();

    let json = serde_json::to_string_pretty(&exportable)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;

    Ok(certificates.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_certificates() {
        let cert = Certificate {
            token_id: 5,
            name: "Bob".into(),
            program: "EE".into(),
            grade: "B".into(),
            year: 2022,
            issued_at: 0,
            owner: "0xdef".into(),
            token_uri: "ipfs://5".into(),
            is_owner: false,
        };
        let path = std::env::temp_dir().join(format!("certdeck-json-{}.json", std::process::id()));

        let count = write_certificates(&path, &[&cert]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(count, 1);
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value[0]["token_id"], 5);
        assert_eq!(value[0]["issued"], "1970-01-01");
        assert_eq!(value[0]["is_owner"], false);
    }
}
