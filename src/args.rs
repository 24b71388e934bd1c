use clap::Parser;

/// This program scores CSR questionnaires and writes the data file of the dashboard.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON file describing the pillars, the questionnaire columns and the response files.
    /// For more information about the file format, read the documentation of the csr_scoring crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference data file in JSON format. If provided, csrscore will
    /// check that the generated document matches the reference (the update timestamp is ignored).
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the data file will be written to the given
    /// location. Setting this option overrides the path that may be specified in the configuration.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (language=file path, may be repeated) If specified, the responses for this language are read
    /// from the given file instead of the file named in the configuration. Example: --input fr=reponses.csv
    #[clap(short, long, value_parser)]
    pub input: Option<Vec<String>>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
