use clap::ValueEnum;
use turbo_codemod_runner::{JsonReport, ReportSink, TableReport};

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary tables
    #[default]
    Table,
    /// One JSON object per codemod
    Json,
}

impl OutputFormat {
    pub fn sink(self) -> Box<dyn ReportSink> {
        match self {
            OutputFormat::Table => Box::new(TableReport::stdout()),
            OutputFormat::Json => Box::new(JsonReport::stdout()),
        }
    }
}
