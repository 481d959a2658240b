use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use filmstrip_core::scroll::ScrollConfigExt;
use filmstrip_core::sim::{FrameSnapshot, Simulation, Trace, MAX_FRAMES};
use filmstrip_core::AppConfig;

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Print every Nth frame; 0 prints only the summary
    pub every: usize,
    pub realtime: bool,
    pub json: bool,
}

pub async fn run(config: &AppConfig, path: &Path, options: Options) -> Result<()> {
    let trace = Trace::load(path).with_context(|| format!("Failed to load trace {}", path.display()))?;
    let stdout = std::io::stdout();
    replay(config, trace, options, &mut stdout.lock()).await
}

pub async fn replay(config: &AppConfig, trace: Trace, options: Options, out: &mut impl Write) -> Result<()> {
    let mut sim = Simulation::new(config, trace)?;
    let mut interval = options.realtime.then(|| {
        let period = Duration::from_secs_f64(config.scroll.frame_interval_ms() / 1000.0);
        tokio::time::interval(period)
    });

    let mut frame = 0usize;
    while !sim.is_finished() {
        if let Some(interval) = interval.as_mut() {
            interval.tick().await;
        }
        let snapshot = sim.step();
        frame += 1;
        if options.every > 0 && frame % options.every == 0 {
            print_snapshot(out, &snapshot, options.json)?;
        }
        if frame >= MAX_FRAMES {
            tracing::warn!("Trace did not settle within {} frames", MAX_FRAMES);
            break;
        }
    }

    let last = sim.snapshot();
    if options.every > 0 && frame % options.every != 0 {
        print_snapshot(out, &last, options.json)?;
    }

    let stats = sim.stats();
    writeln!(out)?;
    writeln!(
        out,
        "Simulated {} frames ({:.1}ms), {} events, {} wheel redirected, {} passed through",
        stats.frames, last.at_ms, stats.events, stats.wheel_redirected, stats.wheel_passed
    )?;
    writeln!(out, "Final offsets: {}", format_offsets(&last))?;
    Ok(())
}

fn print_snapshot(out: &mut impl Write, snapshot: &FrameSnapshot, json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(snapshot)?)?;
    } else {
        writeln!(out, "{:>9.1}ms  {}", snapshot.at_ms, format_offsets(snapshot))?;
    }
    Ok(())
}

fn format_offsets(snapshot: &FrameSnapshot) -> String {
    snapshot
        .offsets
        .iter()
        .map(|(role, offset)| format!("{}={:.1}", role, offset))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use filmstrip_core::SurfaceRole;

    const TRACE: &str = r#"
        [[surfaces]]
        role = "primary"
        content = 3000
        visible = 1000

        [[surfaces]]
        role = "proxy"
        content = 3000
        visible = 1000

        [[events]]
        at_ms = 0
        kind = "wheel"
        delta_y = 100
        target = "primary"
    "#;

    #[test]
    fn test_format_offsets() {
        let snapshot = FrameSnapshot {
            at_ms: 16.7,
            offsets: BTreeMap::from([(SurfaceRole::Primary, 12.345), (SurfaceRole::Proxy, 12.345)]),
        };
        assert_eq!(format_offsets(&snapshot), "primary=12.3 proxy=12.3");
    }

    #[tokio::test]
    async fn test_replay_prints_summary() {
        let trace = Trace::from_toml_str(TRACE).unwrap();
        let mut out = Vec::new();
        let options = Options {
            every: 0,
            ..Default::default()
        };
        replay(&AppConfig::default(), trace, options, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("1 events, 1 wheel redirected, 0 passed through"));
        assert!(text.contains("primary=180.0 proxy=180.0"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_realtime_replay_paces_frames() {
        let trace = Trace::from_toml_str(&format!("duration_ms = 1000\n{}", TRACE)).unwrap();
        let options = Options {
            realtime: true,
            ..Default::default()
        };
        let started = tokio::time::Instant::now();
        let mut out = Vec::new();
        replay(&AppConfig::default(), trace, options, &mut out).await.unwrap();

        // About 60 frames, each waiting one tick of the paused clock
        let period = Duration::from_secs_f64(1.0 / 60.0);
        assert!(started.elapsed() >= period * 55, "elapsed {:?}", started.elapsed());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("primary=180.0 proxy=180.0"));
    }

    #[tokio::test]
    async fn test_replay_json_lines() {
        let trace = Trace::from_toml_str(TRACE).unwrap();
        let mut out = Vec::new();
        let options = Options {
            every: 5,
            json: true,
            ..Default::default()
        };
        replay(&AppConfig::default(), trace, options, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let first = text.lines().next().unwrap();
        let value: serde_json::Value = serde_json::from_str(first).unwrap();
        assert!(value["offsets"]["primary"].as_f64().unwrap() > 0.0);
    }
}
