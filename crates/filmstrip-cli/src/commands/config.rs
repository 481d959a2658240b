use std::io::Write;

use anyhow::Result;

use filmstrip_core::scroll::ScrollConfigExt;
use filmstrip_core::AppConfig;

/// Distance used to summarize how the scroll tuning feels
const SAMPLE_DISTANCE_PX: f64 = 1000.0;

pub fn run(config: &AppConfig) -> Result<()> {
    let stdout = std::io::stdout();
    render(config, &mut stdout.lock())
}

fn render(config: &AppConfig, out: &mut impl Write) -> Result<()> {
    match config.scroll.settle_time_ms(SAMPLE_DISTANCE_PX) {
        Some(ms) => writeln!(out, "# {}px of wheel input settles in {:.0}ms", SAMPLE_DISTANCE_PX, ms)?,
        None => writeln!(out, "# smooth scrolling off, wheel input applies instantly")?,
    }
    write!(out, "{}", config.to_toml_string()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_config_round_trips() {
        let config = AppConfig::default();
        let mut out = Vec::new();
        render(&config, &mut out).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.starts_with("# 1000px of wheel input settles in"));
        assert!(rendered.contains("[scroll]"));
        assert!(rendered.contains("[elements]"));

        let parsed = AppConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(parsed.elements.primary, "image-row");
        assert_eq!(parsed.scroll.tween_duration_ms, 200);
    }

    #[test]
    fn test_instant_config_summary() {
        let mut config = AppConfig::default();
        config.scroll.smooth_enabled = false;
        let mut out = Vec::new();
        render(&config, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("# smooth scrolling off"));
    }
}
