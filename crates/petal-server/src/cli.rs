//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "petal-server")]
#[command(about = "Petal iris classification service", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PETAL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// ONNX model file
    #[arg(short, long, env = "PETAL_MODEL")]
    pub model: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "PETAL_PORT")]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Load the model before accepting requests
    #[arg(long)]
    pub wait_for_model: bool,
}
