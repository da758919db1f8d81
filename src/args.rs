use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use yield_text::{ExtractionStrategy, FetchMode};

#[derive(Parser, Debug)]
#[command(name = "yield-text")]
#[command(about = "Fetches a batch of pages and extracts their readable text")]
#[command(version)]
pub struct Args {
    /// URLs to process
    pub urls: Vec<String>,

    /// File with one URL per line ("-" reads stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// How pages are fetched [default: static]
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Text extraction strategy [default: denylist]
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Number of pages processed at once [default: 5]
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the results table to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print the full report as JSON instead of text blocks
    #[arg(long)]
    pub json: bool,

    /// Characters of body text shown per page (0 shows everything)
    #[arg(long, default_value_t = 0)]
    pub preview: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Static,
    Rendered,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    TagScan,
    Denylist,
    Readability,
    Boilerplate,
}

/// Convert from CLI argument mode to internal fetch mode
pub fn convert_mode(arg: ModeArg) -> FetchMode {
    match arg {
        ModeArg::Static => FetchMode::Static,
        ModeArg::Rendered => FetchMode::Rendered,
    }
}

/// Convert from CLI argument strategy to internal extraction strategy
pub fn convert_strategy(arg: StrategyArg) -> ExtractionStrategy {
    match arg {
        StrategyArg::TagScan => ExtractionStrategy::TagScan,
        StrategyArg::Denylist => ExtractionStrategy::DenylistFiltered,
        StrategyArg::Readability => ExtractionStrategy::Readability,
        StrategyArg::Boilerplate => ExtractionStrategy::BoilerplateClassifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "yield-text",
            "https://a.example/",
            "https://b.example/",
            "--mode",
            "rendered",
            "--strategy",
            "tag-scan",
            "--concurrency",
            "3",
            "--csv",
            "out.csv",
            "--preview",
            "200",
        ])
        .unwrap();

        assert_eq!(args.urls.len(), 2);
        assert_eq!(args.mode, Some(ModeArg::Rendered));
        assert_eq!(args.strategy, Some(StrategyArg::TagScan));
        assert_eq!(args.concurrency, Some(3));
        assert_eq!(args.csv, Some(PathBuf::from("out.csv")));
        assert_eq!(args.preview, 200);
        assert!(!args.json);
    }

    #[test]
    fn test_defaults_leave_config_alone() {
        let args = Args::try_parse_from(["yield-text", "--input", "-"]).unwrap();
        assert!(args.urls.is_empty());
        assert_eq!(args.input, Some(PathBuf::from("-")));
        assert!(args.mode.is_none());
        assert!(args.strategy.is_none());
        assert!(args.concurrency.is_none());
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(Args::try_parse_from(["yield-text", "--strategy", "magic"]).is_err());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(convert_mode(ModeArg::Static), FetchMode::Static);
        assert_eq!(
            convert_strategy(StrategyArg::Denylist),
            ExtractionStrategy::DenylistFiltered
        );
        assert_eq!(
            convert_strategy(StrategyArg::Boilerplate),
            ExtractionStrategy::BoilerplateClassifier
        );
    }
}
