//! Presentation helpers shared by the renderer and the exporters

use chrono::{DateTime, Utc};
use ratatui::style::Color;

use crate::config::Config;

/// `0x1234...abcd`; short or non-hex values are returned unchanged
pub fn short_address(address: &str) -> String {
    let address = address.trim();
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

fn utc_datetime(secs: u64) -> Option<DateTime<Utc>> {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// Issue date as "January 1, 2024" (UTC)
pub fn format_issued_date(secs: u64) -> String {
    utc_datetime(secs)
        .map(|dt| dt.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| "Unknown date".to_string())
}

/// Issue date as "2024-01-01" (UTC), used by exports
pub fn format_iso_date(secs: u64) -> String {
    utc_datetime(secs)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Display color for a grade; unknown grades render in the default style
pub fn grade_color(config: &Config, grade: &str) -> Option<Color> {
    config.grade_color(grade).and_then(color_from_name)
}

fn color_from_name(name: &str) -> Option<Color> {
    let color = match name.trim().to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        hex => {
            let digits = hex.strip_prefix('#')?;
            if digits.len() != 6 {
                return None;
            }
            let value = u32::from_str_radix(digits, 16).ok()?;
            Color::Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
        }
    };
    Some(color)
}

/// NFT viewer page for one certificate
pub fn certificate_link(base: &str, contract: &str, token_id: u64) -> String {
    format!("{}{}/{}", base, contract, token_id)
}

/// Explorer page for the certificate contract
pub fn contract_link(base: &str, contract: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), contract)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_address() {
        assert_eq!(
            short_address("0x1234567890abcdef1234567890abcdef1234abcd"),
            "0x1234...abcd"
        );
        assert_eq!(short_address("0x1234"), "0x1234");
        assert_eq!(short_address(""), "");
    }

    #[test]
    fn test_dates() {
        assert_eq!(format_issued_date(1_704_067_200), "January 1, 2024");
        assert_eq!(format_issued_date(1_686_787_200), "June 15, 2023");
        assert_eq!(format_iso_date(1_704_067_200), "2024-01-01");
        assert_eq!(format_iso_date(0), "1970-01-01");
        assert_eq!(format_issued_date(u64::MAX), "Unknown date");
    }

    #[test]
    fn test_grade_color() {
        let mut config = Config::default();
        assert_eq!(grade_color(&config, "A+"), Some(Color::Green));
        assert_eq!(grade_color(&config, "F"), Some(Color::Red));
        assert_eq!(grade_color(&config, "Pass"), None);

        config.grade_colors.insert("Pass".into(), "#ff8000".into());
        config.grade_colors.insert("A+".into(), "LightCyan".into());
        config.grade_colors.insert("B".into(), "chartreuse".into());
        assert_eq!(grade_color(&config, "Pass"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(grade_color(&config, "A+"), Some(Color::LightCyan));
        assert_eq!(grade_color(&config, "B"), None);
    }

    #[test]
    fn test_links() {
        assert_eq!(
            certificate_link("https://testnet.bscscan.com/nft/", "0xabc", 7),
            "https://testnet.bscscan.com/nft/0xabc/7"
        );
        assert_eq!(
            contract_link("https://testnet.bscscan.com/address", "0xabc"),
            "https://testnet.bscscan.com/address/0xabc"
        );
        assert_eq!(
            contract_link("https://testnet.bscscan.com/address/", "0xabc"),
            "https://testnet.bscscan.com/address/0xabc"
        );
    }
}
