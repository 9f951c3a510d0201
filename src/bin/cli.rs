use clap::Parser;
use navmap::batch::{VariationRequest, generate_variations};
use navmap::navigation::ascii::render_ascii;
use navmap::navigation::graph::unreachable_nodes;
use navmap::{MapGenerationConfig, NavigationMap};
use std::path::{Path, PathBuf};

/// Генератор навигационных карт забега
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к файлу запуска в формате TOML
    #[arg(short, long)]
    config: PathBuf,

    /// Путь для сохранения карты в JSON (по умолчанию: ./navigation_map.json)
    #[arg(short, long, default_value = "navigation_map.json")]
    output: PathBuf,

    /// Переопределяет сид из конфигурации
    #[arg(short, long)]
    seed: Option<u64>,

    /// Переопределяет число вариантов из конфигурации
    #[arg(short, long)]
    variations: Option<usize>,

    /// Печатать текстовый дамп каждой карты
    #[arg(long)]
    ascii: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    println!("🔍 Загрузка конфигурации...");
    let config = MapGenerationConfig::from_toml_file(&cli.config)?;
    let registry = config.registry()?;
    log::info!(
        "loaded {} node kinds from {}",
        registry.len(),
        cli.config.display()
    );

    let base_seed = cli.seed.or(config.seed).unwrap_or_else(rand::random);
    let variations = cli.variations.unwrap_or(config.variations).max(1);

    println!(
        "Генерация {variations} вариантов (узлов: {}, сид: {base_seed})...",
        config.max_nodes
    );
    let request = VariationRequest {
        definitions: registry.as_map(),
        start_kind: &config.start_kind,
        end_kind: &config.end_kind,
        max_nodes: config.max_nodes,
        parameters: &config.parameters,
    };

    let mut maps = Vec::with_capacity(variations);
    for (seed, result) in generate_variations(&request, base_seed, variations) {
        let map = result?;
        print_summary(seed, &map, &config.end_kind);
        if cli.ascii {
            println!("{}\n", render_ascii(&map));
        }
        maps.push(map);
    }

    println!("Сохранение в {:?}", cli.output);
    save_maps(&maps, &cli.output)?;

    println!("\nГотово! Карты сохранены.");
    Ok(())
}

fn print_summary(seed: u64, map: &NavigationMap, end_kind: &str) {
    let breadth: Vec<String> = map
        .breadth_by_depth()
        .values()
        .map(ToString::to_string)
        .collect();
    let end_fan_in = map
        .end_node(end_kind)
        .map_or(0, |end| map.incoming_count(end.id()));

    println!(
        "  сид {seed}: узлов {}, глубина {}, фронт [{}], входов в финал {end_fan_in}",
        map.len(),
        map.max_depth(),
        breadth.join(" ")
    );

    let orphans = unreachable_nodes(map);
    if !orphans.is_empty() {
        log::warn!("seed {seed}: unreachable nodes {orphans:?}");
    }
}

fn save_maps(maps: &[NavigationMap], path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(path)?;
    match maps {
        [single] => serde_json::to_writer_pretty(file, single)?,
        _ => serde_json::to_writer_pretty(file, maps)?,
    }
    Ok(())
}
