//! CSV Export
//!
//! Writes the visible certificates to a CSV file.

use std::path::Path;

use crate::domain::Certificate;
use crate::ui::format::format_iso_date;

/// Write certificates to CSV file
pub fn write_certificates(
    path: &Path,
    certificates: &[&Certificate],
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "token_id",
        "name",
        "program",
        "grade",
        "year",
        "issued",
        "owner",
        "is_owner",
        "token_uri",
    ])?;

    for cert in certificates {
        wtr.write_record([
            cert.token_id.to_string(),
            cert.name.clone(),
            cert.program.clone(),
            cert.grade.clone(),
            cert.year.to_string(),
            format_iso_date(cert.issued_at),
            cert.owner.clone(),
            cert.is_owner.to_string(),
            cert.token_uri.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(certificates.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_certificates() {
        let cert = Certificate {
            token_id: 3,
            name: "Smith, Alice".into(),
            program: "CS".into(),
            grade: "A".into(),
            year: 2023,
            issued_at: 1_704_067_200,
            owner: "0xabc".into(),
            token_uri: "ipfs://3".into(),
            is_owner: true,
        };
        let path = std::env::temp_dir().join(format!("certdeck-csv-{}.csv", std::process::id()));

        let count = write_certificates(&path, &[&cert]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(count, 1);
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("token_id,name,program"));
        assert_eq!(
            lines.next().unwrap(),
            "3,\"Smith, Alice\",CS,A,2023,2024-01-01,0xabc,true,ipfs://3"
        );
    }
}
