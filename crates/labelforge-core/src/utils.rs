// this_file: crates/labelforge-core/src/utils.rs

//! Utility functions for the labelforge engine.

/// Parse a colour string to RGBA.
///
/// Accepts `#RRGGBB`, `#RRGGBBAA`, `black`, `white` and `transparent`.
pub fn parse_color(color: &str) -> Result<(u8, u8, u8, u8), String> {
    if let Some(hex) = color.strip_prefix('#') {
        if !hex.is_ascii() {
            return Err(format!("non-hex characters in '{color}'"));
        }
        if hex.len() == 6 {
            let r = u8::from_str_radix(&hex[0..2], 16).map_err(|e| e.to_string())?;
            let g = u8::from_str_radix(&hex[2..4], 16).map_err(|e| e.to_string())?;
            let b = u8::from_str_radix(&hex[4..6], 16).map_err(|e| e.to_string())?;
            return Ok((r, g, b, 255));
        } else if hex.len() == 8 {
            let r = u8::from_str_radix(&hex[0..2], 16).map_err(|e| e.to_string())?;
            let g = u8::from_str_radix(&hex[2..4], 16).map_err(|e| e.to_string())?;
            let b = u8::from_str_radix(&hex[4..6], 16).map_err(|e| e.to_string())?;
            let a = u8::from_str_radix(&hex[6..8], 16).map_err(|e| e.to_string())?;
            return Ok((r, g, b, a));
        }
        return Err(format!("expected 6 or 8 hex digits in '{color}'"));
    }

    match color {
        "black" => Ok((0, 0, 0, 255)),
        "white" => Ok((255, 255, 255, 255)),
        "transparent" => Ok((0, 0, 0, 0)),
        _ => Err(format!("unrecognised colour '{color}'")),
    }
}

/// System font directories for different platforms
pub fn system_font_dirs() -> Vec<String> {
    #[cfg(target_os = "macos")]
    {
        vec![
            "/System/Library/Fonts".to_string(),
            "/System/Library/Fonts/Supplemental".to_string(),
            "/Library/Fonts".to_string(),
            "~/Library/Fonts".to_string(),
        ]
    }

    #[cfg(target_os = "windows")]
    {
        vec!["C:\\Windows\\Fonts".to_string()]
    }

    #[cfg(target_os = "linux")]
    {
        vec![
            "/usr/share/fonts".to_string(),
            "/usr/share/fonts/truetype/dejavu".to_string(),
            "/usr/share/fonts/truetype/msttcorefonts".to_string(),
            "/usr/share/fonts/TTF".to_string(),
            "/usr/local/share/fonts".to_string(),
            "~/.fonts".to_string(),
            "~/.local/share/fonts".to_string(),
        ]
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#FF0000").unwrap(), (255, 0, 0, 255));
        assert_eq!(parse_color("#00FF00FF").unwrap(), (0, 255, 0, 255));
        assert_eq!(parse_color("transparent").unwrap(), (0, 0, 0, 0));
        assert_eq!(parse_color("white").unwrap(), (255, 255, 255, 255));
    }

    #[test]
    fn test_parse_color_rejects_garbage() {
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#GG0000").is_err());
        assert!(parse_color("mauve").is_err());
        // six bytes, but not six ASCII digits
        assert!(parse_color("#aéééa").is_err());
        assert!(parse_color("#ééé").is_err());
    }
}
