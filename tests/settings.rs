use hexgen::{GeneratorSettings, HemisphereMode, HexDirection, MapError, MapGenerator};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn partial_toml_keeps_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
use_fixed_seed = true
seed = 42
width = 30

[land]
land_percentage = 35
region_count = 2
map_border_z = 0

[climate]
wind_direction = "E"

[biome]
hemisphere = "North"
"#
    )
    .unwrap();

    let settings = GeneratorSettings::from_toml_file(file.path()).unwrap();
    assert!(settings.use_fixed_seed);
    assert_eq!(settings.seed, 42);
    assert_eq!(settings.width, 30);
    assert_eq!(settings.height, 15);
    assert_eq!(settings.land.land_percentage, 35);
    assert_eq!(settings.land.region_count, 2);
    assert_eq!(settings.land.water_level, 3);
    assert_eq!(settings.climate.wind_direction, HexDirection::E);
    assert_eq!(settings.biome.hemisphere, HemisphereMode::North);
    assert_eq!(settings.erosion, GeneratorSettings::default().erosion);

    let (grid, report) = MapGenerator::new(settings.clone())
        .generate(settings.width, settings.height)
        .unwrap();
    assert_eq!(grid.cell_count(), 450);
    assert_eq!(report.regions, 2);
}

#[test]
fn broken_toml_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[land\nland_percentage = ").unwrap();
    assert!(matches!(
        GeneratorSettings::from_toml_file(file.path()),
        Err(MapError::Toml(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        GeneratorSettings::from_toml_file(dir.path().join("nope.toml")),
        Err(MapError::Io(_))
    ));
}

#[test]
fn preview_is_written_as_png() {
    let mut settings = GeneratorSettings::default();
    settings.use_fixed_seed = true;
    let (grid, _) = MapGenerator::new(settings).generate(20, 15).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preview.png");
    hexgen::preview::save_preview(&grid, 8, &path).unwrap();
    let image = image::open(&path).unwrap();
    assert_eq!(image.width(), 164);
}
