use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{PresetLibrary, SimulationConfig};
use crate::persistence::{self, Snapshot};
use crate::simulation::statistics::{compute_statistics, DayStatistics};
use crate::simulation::Simulation;
use crate::world::generation::print_grid_summary;
use crate::world::render::{heightmap, print_legend, terrain_map};

/// Build the initial grid and print it without simulating any days.
///
/// With `heightmap_path`, also writes the rectangular heightmap there as
/// JSON rows for external plotting.
pub fn generate(
    config: &SimulationConfig,
    presets: &PresetLibrary,
    heightmap_path: Option<&Path>,
) -> Result<(), String> {
    let sim = Simulation::new(config, presets).map_err(|e| format!("Generation failed: {}", e))?;

    if let Some(path) = heightmap_path {
        let rows = heightmap(sim.grid());
        let json = serde_json::to_string(&rows)
            .map_err(|e| format!("Cannot encode heightmap: {}", e))?;
        std::fs::write(path, json)
            .map_err(|e| format!("Cannot write heightmap {}: {}", path.display(), e))?;
        info!(path = %path.display(), side = rows.len(), "Heightmap written");
    }

    println!("Preset: {}", sim.preset().name);
    println!("Generation seed: {}", sim.generation_seed());
    print_grid_summary(sim.grid(), sim.seed());
    println!();
    print!("{}", terrain_map(sim.grid()));
    print_legend();
    Ok(())
}

/// Run the configured number of days, export the history and print a
/// summary. Returns the path of the exported history.
pub fn run_simulation(
    config: &SimulationConfig,
    presets: &PresetLibrary,
) -> Result<PathBuf, String> {
    let mut sim =
        Simulation::new(config, presets).map_err(|e| format!("Cannot start simulation: {}", e))?;
    eprintln!(
        "Simulating {} days on {} cells (preset {}, seed {})",
        config.days,
        sim.grid().len(),
        sim.preset().name,
        sim.seed()
    );

    let reports = sim
        .run(config.days)
        .map_err(|e| format!("Simulation error: {}", e))?;

    let dir = Path::new(&config.history_directory);
    let path = persistence::export_history(sim.history(), dir, config.history_format)
        .map_err(|e| format!("Cannot export history: {}", e))?;
    info!(path = %path.display(), snapshots = sim.history().len(), "History exported");

    let events: Vec<String> = reports
        .iter()
        .filter_map(|r| r.event.map(|kind| format!("day {}: {}", r.day, kind)))
        .collect();

    print_grid_summary(sim.grid(), sim.seed());
    println!("\nSeason: {:?} (day {})", sim.current_season(), sim.current_day());
    if events.is_empty() {
        println!("Events: none");
    } else {
        println!("Events ({}):", events.len());
        for e in &events {
            println!("  {}", e);
        }
    }
    println!();
    print!("{}", terrain_map(sim.grid()));
    print_legend();
    println!("\nHistory saved to {}", path.display());

    Ok(path)
}

pub fn list_presets(presets: &PresetLibrary) {
    match presets.source() {
        Some(path) => println!("Presets from {}:", path.display()),
        None => println!("Built-in presets:"),
    }
    println!(
        "{:<12} {:>6} {:>7} {:>7} {:>7}  {}",
        "Name", "Width", "Scale", "Octaves", "Water", "Terrain"
    );
    println!("{}", "-".repeat(56));
    for p in presets.presets() {
        println!(
            "{:<12} {:>6} {:>7.1} {:>7} {:>7.2}  {}",
            p.name,
            p.grid_width,
            p.scale,
            p.octaves,
            p.water_level,
            p.terrain_type.name()
        );
    }
}

/// Statistics for one recorded day, the last one when `day` is `None`.
pub fn snapshot_statistics(path: &Path, day: Option<u64>) -> Result<(Snapshot, DayStatistics), String> {
    let history = persistence::load_history(path)
        .map_err(|e| format!("Failed to load history: {}", e))?;

    let snapshot = match day {
        Some(d) => history.get(d).ok_or_else(|| {
            format!(
                "Day {} not found ({} has {} days)",
                d,
                path.display(),
                history.len()
            )
        })?,
        None => history
            .last()
            .ok_or_else(|| format!("{} contains no days", path.display()))?,
    };

    let stats = compute_statistics(
        snapshot.day,
        snapshot.terrain.iter().map(|(_, c)| {
            (
                c.terrain_type,
                c.height,
                c.water_level,
                c.vegetation,
                c.temperature,
            )
        }),
    );
    Ok((snapshot.clone(), stats))
}

/// Print one recorded day of an exported history.
pub fn inspect(path: &Path, day: Option<u64>) -> Result<(), String> {
    let (snapshot, stats) = snapshot_statistics(path, day)?;

    println!("=== Day {} ===", snapshot.day);
    println!("Cells: {}", snapshot.terrain.len());
    println!();
    println!("--- Weather ---");
    println!("  Rain: {:.3}", snapshot.weather.rain_intensity);
    println!("  Snow: {:.3}", snapshot.weather.snow_intensity);
    println!("  Wind: {:.3}", snapshot.weather.wind_speed);
    println!("  Drought: {}", snapshot.weather.drought);
    match snapshot.event {
        Some(kind) => println!("  Event: {}", kind),
        None => println!("  Event: none"),
    }
    println!();
    println!("--- Averages ---");
    println!("  Height: {:.3}", stats.avg_height);
    println!("  Water level: {:.3}", stats.avg_water_level);
    println!("  Vegetation: {:.3}", stats.avg_vegetation);
    println!("  Temperature: {:.1}°C", stats.avg_temperature);
    println!("  Diversity: {:.3}", stats.diversity_index);
    println!();

    println!("--- Terrain Distribution ---");
    let n = snapshot.terrain.len().max(1) as f64;
    let mut sorted: Vec<_> = stats.terrain_distribution.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1));
    for (terrain, count) in sorted {
        let pct = (*count as f64 / n) * 100.0;
        println!("  {}: {} ({:.1}%)", terrain.name(), count, pct);
    }
    println!();
    print!("{}", terrain_map(&snapshot.to_grid()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::HistoryFormat;
    use tempfile::TempDir;

    const TEST_PRESETS: &str = r#"
[default]
grid_width = 8

[desert]
grid_width = 8
terrain_type = "desert"
"#;

    fn setup(dir: &TempDir, format: HistoryFormat) -> (SimulationConfig, PresetLibrary) {
        let presets =
            PresetLibrary::from_toml_str(TEST_PRESETS, Path::new("test-presets.toml")).unwrap();
        let config = SimulationConfig {
            days: 4,
            days_per_season: 2,
            seed: 17,
            region_presets: vec!["desert".to_string()],
            history_directory: dir.path().join("out").to_string_lossy().into_owned(),
            history_format: format,
            ..SimulationConfig::default()
        };
        (config, presets)
    }

    #[test]
    fn run_exports_history_with_every_day() {
        let dir = TempDir::new().unwrap();
        let (config, presets) = setup(&dir, HistoryFormat::Json);

        let path = run_simulation(&config, &presets).unwrap();
        assert!(path.starts_with(dir.path().join("out")));
        let history = persistence::load_history(&path).unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history.last().unwrap().day, 3);
    }

    #[test]
    fn inspect_defaults_to_last_day() {
        let dir = TempDir::new().unwrap();
        let (config, presets) = setup(&dir, HistoryFormat::Bincode);
        let path = run_simulation(&config, &presets).unwrap();

        let (snapshot, stats) = snapshot_statistics(&path, None).unwrap();
        assert_eq!(snapshot.day, 3);
        assert_eq!(stats.day, 3);
        let counted: u32 = stats.terrain_distribution.values().sum();
        assert_eq!(counted as usize, snapshot.terrain.len());

        let (first, _) = snapshot_statistics(&path, Some(0)).unwrap();
        assert_eq!(first.day, 0);
        assert!(inspect(&path, Some(1)).is_ok());
    }

    #[test]
    fn inspect_missing_day_is_error() {
        let dir = TempDir::new().unwrap();
        let (config, presets) = setup(&dir, HistoryFormat::Json);
        let path = run_simulation(&config, &presets).unwrap();

        let err = inspect(&path, Some(40)).unwrap_err();
        assert!(err.contains("Day 40 not found"));
    }

    #[test]
    fn inspect_missing_file_is_error() {
        let err = inspect(Path::new("/nonexistent/history.json"), None).unwrap_err();
        assert!(err.contains("Failed to load history"));
    }

    #[test]
    fn generate_succeeds_with_valid_config() {
        let dir = TempDir::new().unwrap();
        let (config, presets) = setup(&dir, HistoryFormat::Json);
        assert!(generate(&config, &presets, None).is_ok());
        assert!(!dir.path().join("out").exists(), "generate writes no history");
    }

    #[test]
    fn generate_writes_square_heightmap() {
        let dir = TempDir::new().unwrap();
        let (config, presets) = setup(&dir, HistoryFormat::Json);
        let path = dir.path().join("heights.json");

        generate(&config, &presets, Some(&path)).unwrap();

        let rows: Vec<Vec<f64>> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        // grid_width 8 gives radius 4
        assert_eq!(rows.len(), 9);
        assert!(rows.iter().all(|row| row.len() == 9));
        assert!(rows.iter().flatten().all(|h| (0.0..=1.0).contains(h)));
        assert_eq!(rows[0][0], 0.0, "corner lies outside the hexagon");
    }

    #[test]
    fn generate_reports_unwritable_heightmap() {
        let dir = TempDir::new().unwrap();
        let (config, presets) = setup(&dir, HistoryFormat::Json);
        let path = dir.path().join("missing").join("heights.json");
        let err = generate(&config, &presets, Some(&path)).unwrap_err();
        assert!(err.contains("Cannot write heightmap"));
    }
}
