// src/types.rs

use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use encoding_rs::Encoding;
use serde::Deserialize;

/// Character encoding used to decode a child's output bytes.
///
/// - `Auto`: the platform default. Windows consoles emit text in the legacy
///   code page (GBK is assumed); everything else is treated as UTF-8.
/// - `Explicit`: any WHATWG encoding label accepted by `encoding_rs`.
///
/// Decoding never fails: malformed sequences become U+FFFD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum TextEncoding {
    #[default]
    Auto,
    Explicit(&'static Encoding),
}

impl TextEncoding {
    /// The concrete encoding after resolving `Auto` for this platform.
    pub fn encoding(self) -> &'static Encoding {
        match self {
            TextEncoding::Auto if cfg!(windows) => encoding_rs::GBK,
            TextEncoding::Auto => encoding_rs::UTF_8,
            TextEncoding::Explicit(enc) => enc,
        }
    }

    /// Decode one line of output, replacing malformed byte sequences.
    pub fn decode(self, bytes: &[u8]) -> String {
        let (text, _had_errors) = self.encoding().decode_without_bom_handling(bytes);
        text.into_owned()
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        if label.eq_ignore_ascii_case("auto") {
            return Ok(TextEncoding::Auto);
        }
        let enc = Encoding::for_label(label.as_bytes()).ok_or_else(|| {
            format!("unknown encoding label: {label} (expected \"auto\" or a WHATWG label such as \"utf-8\" or \"gbk\")")
        })?;

        // Output is split into lines on the 0x0A byte before decoding, which
        // only works when '\n' encodes as that single byte.
        if enc == encoding_rs::REPLACEMENT || !enc.is_ascii_compatible() {
            return Err(format!(
                "encoding {} cannot be used for command output (line splitting needs an ASCII-compatible encoding)",
                enc.name()
            ));
        }
        Ok(TextEncoding::Explicit(enc))
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Operating system family, used to pick the built-in command presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    Windows,
    Linux,
    Macos,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Macos
        } else {
            Platform::Linux
        }
    }
}

/// Parse a simple duration string like `"30s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_accepts_known_units() {
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration(" 2m "), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("30").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("5 days").is_err());
        assert!(parse_duration("307445734561825861m").is_err());
        assert!(parse_duration("5124095576030432h").is_err());
        assert!(parse_duration("99999999999999999999s").is_err());
    }

    #[test]
    fn encoding_labels_resolve() {
        assert_eq!("auto".parse::<TextEncoding>(), Ok(TextEncoding::Auto));
        assert_eq!(
            "GBK".parse::<TextEncoding>(),
            Ok(TextEncoding::Explicit(encoding_rs::GBK))
        );
        assert!("klingon".parse::<TextEncoding>().is_err());
        assert_eq!(
            "shift_jis".parse::<TextEncoding>(),
            Ok(TextEncoding::Explicit(encoding_rs::SHIFT_JIS))
        );
    }

    #[test]
    fn encodings_that_break_line_splitting_are_rejected() {
        for label in ["utf-16le", "utf-16be", "utf-16", "replacement", "iso-2022-kr", "iso-2022-jp"] {
            assert!(label.parse::<TextEncoding>().is_err(), "{label} was accepted");
        }
    }

    #[test]
    fn decode_replaces_malformed_bytes() {
        let enc = TextEncoding::Explicit(encoding_rs::UTF_8);
        assert_eq!(enc.decode(b"ok \xff done"), "ok \u{FFFD} done");
    }

    #[test]
    fn gbk_decodes_chinese_text() {
        let enc = TextEncoding::Explicit(encoding_rs::GBK);
        // "中文" in GBK
        assert_eq!(enc.decode(&[0xD6, 0xD0, 0xCE, 0xC4]), "中文");
    }
}
