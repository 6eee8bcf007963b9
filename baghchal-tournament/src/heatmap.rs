//! Score-matrix heat map, rendered as a standalone SVG

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::ArenaPaths;
use crate::error::{ArenaError, Result};
use crate::tournament::ScoreMatrix;

const CELL: usize = 56;
const LABEL_WIDTH: usize = 220;
const HEADER_HEIGHT: usize = 60;

/// `<tournament_logs>/<YYYY_MM_DD>_<experiment>_results.svg`
pub fn heatmap_path(paths: &ArenaPaths, experiment: &str) -> PathBuf {
    paths.tournament_logs().join(format!(
        "{}_{}_results.svg",
        Local::now().format("%Y_%m_%d"),
        experiment
    ))
}

/// Render and write the heat map
pub fn write_heatmap(matrix: &ScoreMatrix, title: &str, path: &Path) -> Result<()> {
    if matrix.is_empty() {
        return Err(ArenaError::Config("no models to plot".to_string()));
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| ArenaError::io(format!("creating {}", dir.display()), e))?;
    }
    std::fs::write(path, render_svg(matrix, title))
        .map_err(|e| ArenaError::io(format!("writing {}", path.display()), e))
}

/// Row agent's score against the column agent; red is 0.0, green is 1.0
pub fn render_svg(matrix: &ScoreMatrix, title: &str) -> String {
    let n = matrix.len();
    let width = LABEL_WIDTH + n * CELL + 20;
    let height = HEADER_HEIGHT + n * CELL + 20;
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#,
        w = width,
        h = height
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="20" font-size="16" font-weight="bold">Tournament Results: {}</text>"#,
        LABEL_WIDTH,
        escape(title)
    );

    for (j, _) in matrix.agents().iter().enumerate() {
        let x = LABEL_WIDTH + j * CELL + CELL / 2;
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle">{}</text>"#,
            x,
            HEADER_HEIGHT - 8,
            j + 1
        );
    }

    for (i, agent) in matrix.agents().iter().enumerate() {
        let y = HEADER_HEIGHT + i * CELL;
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="end">{}. {}</text>"#,
            LABEL_WIDTH - 8,
            y + CELL / 2 + 4,
            i + 1,
            escape(agent)
        );

        for j in 0..n {
            let x = LABEL_WIDTH + j * CELL;
            let (fill, label) = match matrix.cell(i, j) {
                Some(score) => (score_color(score), format!("{:.1}", score)),
                None => ("#d9d9d9".to_string(), String::new()),
            };
            let _ = writeln!(
                svg,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="white"/>"#,
                x, y, CELL, CELL, fill
            );
            if !label.is_empty() {
                let _ = writeln!(
                    svg,
                    r#"<text x="{}" y="{}" text-anchor="middle">{}</text>"#,
                    x + CELL / 2,
                    y + CELL / 2 + 4,
                    label
                );
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Red-yellow-green scale over [0, 1]
fn score_color(score: f64) -> String {
    const LOW: (f64, f64, f64) = (215.0, 48.0, 39.0);
    const MID: (f64, f64, f64) = (255.0, 255.0, 191.0);
    const HIGH: (f64, f64, f64) = (26.0, 152.0, 80.0);

    let s = score.clamp(0.0, 1.0);
    let (from, to, t) = if s < 0.5 { (LOW, MID, s * 2.0) } else { (MID, HIGH, (s - 0.5) * 2.0) };
    let mix = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    format!("#{:02x}{:02x}{:02x}", mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> ScoreMatrix {
        let mut matrix = ScoreMatrix::new(&["a<b>".to_string(), "c".to_string()]);
        matrix.record("a<b>", "c", 1.0);
        matrix
    }

    #[test]
    fn test_score_color_endpoints() {
        assert_eq!(score_color(0.0), "#d73027");
        assert_eq!(score_color(0.5), "#ffffbf");
        assert_eq!(score_color(1.0), "#1a9850");
    }

    #[test]
    fn test_render_svg() {
        let svg = render_svg(&matrix(), "exp");
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("a&lt;b&gt;"));
        assert!(svg.contains(">1.0<"));
        assert!(svg.contains(">0.0<"));
        assert!(svg.contains("#d9d9d9"));
    }

    #[test]
    fn test_write_heatmap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("map.svg");
        write_heatmap(&matrix(), "exp", &path).unwrap();
        assert!(path.exists());

        let empty = ScoreMatrix::new(&[]);
        assert!(write_heatmap(&empty, "exp", &dir.path().join("empty.svg")).is_err());
    }
}
