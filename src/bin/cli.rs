use clap::Parser;
use hexgen::{GenerationReport, GeneratorSettings, HexCell, MapError, MapGenerator};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Генератор шестиугольных карт
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML (без него берутся значения по умолчанию)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Фиксированный сид; перекрывает настройки из файла
    #[arg(short, long)]
    seed: Option<u64>,

    /// Ширина карты в ячейках (кратна 5)
    #[arg(long)]
    width: Option<i32>,

    /// Высота карты в ячейках (кратна 5)
    #[arg(long)]
    height: Option<i32>,

    /// Свернуть карту в цилиндр по оси X
    #[arg(long)]
    wrapping: bool,

    /// Путь для сохранения JSON со всеми ячейками
    #[arg(short, long, default_value = "map.json")]
    output: PathBuf,

    /// Путь для отладочного PNG-превью
    #[arg(short, long)]
    preview: Option<PathBuf>,

    /// Размер ячейки на превью в пикселях
    #[arg(long, default_value_t = 16)]
    cell_size: u32,
}

#[derive(Serialize)]
struct MapDump<'a> {
    report: &'a GenerationReport,
    cells: &'a [HexCell],
}

fn main() -> Result<(), MapError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => {
            log::info!("загрузка конфигурации из {}", path.display());
            GeneratorSettings::from_toml_file(path)?
        }
        None => GeneratorSettings::default(),
    };
    if let Some(seed) = cli.seed {
        settings.use_fixed_seed = true;
        settings.seed = seed;
    }
    if cli.wrapping {
        settings.wrapping = true;
    }
    let width = cli.width.unwrap_or(settings.width);
    let height = cli.height.unwrap_or(settings.height);

    let generator = MapGenerator::new(settings);
    let (grid, report) = generator.generate(width, height)?;

    let writer = BufWriter::new(File::create(&cli.output)?);
    serde_json::to_writer_pretty(
        writer,
        &MapDump {
            report: &report,
            cells: grid.cells(),
        },
    )?;
    log::info!("карта сохранена в {}", cli.output.display());

    if let Some(path) = &cli.preview {
        hexgen::preview::save_preview(&grid, cli.cell_size, path)?;
        log::info!("превью сохранено в {}", path.display());
    }

    println!("Готово! Сид карты: {}", report.seed);
    Ok(())
}
