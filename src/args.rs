use clap::Parser;

/// This program computes the consensus ranking of several experts.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The file describing the run: items, expert rankings, weights and rules.
    /// For more information about the file format, read the documentation of the manual module.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path) A reference file containing the summary of a run in JSON format. If provided, conrank will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the events of the run will be written in JSON format to the given
    /// location, one per line. Setting this option overrides the path that may be specified in the configuration.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (number, optional) Only rank the first items. Setting this option overrides the limit of the configuration.
    #[clap(short, long, value_parser)]
    pub limit: Option<usize>,

    /// (expert_id=weight, repeated) Overrides the weight of an expert.
    #[clap(short, long, value_parser)]
    pub weight: Option<Vec<String>>,

    /// (file path, optional) If specified, the pairwise comparison matrices of the experts will be written to this
    /// file in JSON format.
    #[clap(long, value_parser)]
    pub matrices: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
