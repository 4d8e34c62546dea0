use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "walkroute-serve", about = "Pedestrian accessibility routing HTTP service")]
pub struct Cli {
    /// Data directory containing {sidewalks,crossings,elevator_paths}.geojson.
    /// Falls back to the PEDDATADIR environment variable.
    #[arg(long, env = "PEDDATADIR")]
    pub data_dir: std::path::PathBuf,

    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(short, long, default_value_t = 3000)]
    pub port: u16,

    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub log_format: String,

    /// Path to an on-disk graph cache. Read at startup as a rebuild hint
    /// (never authoritative) and rewritten after every successful build
    /// from source. Defaults to `graph.bincode` under the data directory.
    #[arg(long)]
    pub cache_path: Option<std::path::PathBuf>,
}

impl Cli {
    pub fn cache_path(&self) -> std::path::PathBuf {
        self.cache_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("graph.bincode"))
    }
}
