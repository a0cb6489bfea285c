use clap::Parser;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Camera index (overrides config, default 0)
    #[arg(short, long)]
    pub cam_index: Option<u32>,

    /// Pose landmark ONNX model (overrides config)
    #[arg(long)]
    pub model: Option<String>,

    /// Configuration file
    #[arg(long, default_value = AppConfig::PATH)]
    pub config: String,

    /// List available cameras
    #[arg(long)]
    pub list: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["pose-crosshair"]);
        assert_eq!(args.config, AppConfig::PATH);
        assert_eq!(args.cam_index, None);
        assert_eq!(args.model, None);
        assert!(!args.list);
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from(["pose-crosshair", "-c", "2", "--model", "m.onnx", "--config", "alt.json"]);
        assert_eq!(args.cam_index, Some(2));
        assert_eq!(args.model.as_deref(), Some("m.onnx"));
        assert_eq!(args.config, "alt.json");
    }
}
