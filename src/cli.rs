//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Locate and retrieve open-access full text of scholarly articles.
#[derive(Parser, Debug)]
#[command(name = "fulltext")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/fulltext/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask every provider where the full text of an article lives
    Locate(LocateArgs),

    /// Download one file with retries
    Fetch(FetchArgs),

    /// Cross-resolve DOIs, PMIDs and PMCIDs in one request
    ConvertIds(ConvertIdsArgs),

    /// Generate a citation key
    CiteKey(CiteKeyArgs),
}

/// Arguments for `fulltext locate`.
#[derive(clap::Args, Debug)]
#[command(group(
    clap::ArgGroup::new("identifier")
        .required(true)
        .multiple(true)
        .args(["doi", "pmid", "pmcid", "arxiv"])
))]
pub struct LocateArgs {
    /// Digital Object Identifier
    #[arg(long)]
    pub doi: Option<String>,

    /// PubMed ID
    #[arg(long)]
    pub pmid: Option<String>,

    /// PubMed Central ID (with or without the PMC prefix)
    #[arg(long)]
    pub pmcid: Option<String>,

    /// arXiv ID (with or without the arXiv: prefix)
    #[arg(long)]
    pub arxiv: Option<String>,

    /// Contact email for Unpaywall/NCBI (overrides config)
    #[arg(long)]
    pub email: Option<String>,

    /// CORE API key (overrides config)
    #[arg(long)]
    pub core_api_key: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// What `fetch` should retrieve.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FetchKind {
    /// TARGET is a URL serving a PDF
    #[default]
    Pdf,
    /// TARGET is a PMCID; fetches JATS XML from E-utilities
    Xml,
    /// TARGET is an arXiv ID; fetches the arXiv HTML rendering
    Html,
}

/// Arguments for `fulltext fetch`.
#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// URL (pdf), PMCID (xml) or arXiv ID (html)
    pub target: String,

    /// Destination file; parent directories are created
    pub dest: PathBuf,

    /// Expected content kind
    #[arg(short, long, value_enum, default_value_t = FetchKind::Pdf)]
    pub kind: FetchKind,

    /// Maximum attempts (1-10, overrides config)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub retries: Option<u32>,

    /// Backoff base in milliseconds (0-60000, overrides config)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub retry_delay_ms: Option<u64>,
}

/// Arguments for `fulltext convert-ids`.
#[derive(clap::Args, Debug)]
pub struct ConvertIdsArgs {
    /// Identifiers to resolve (DOIs, PMIDs, PMCIDs)
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,

    /// Contact email sent to NCBI (overrides config)
    #[arg(long)]
    pub email: Option<String>,
}

/// Arguments for `fulltext cite-key`.
#[derive(clap::Args, Debug)]
pub struct CiteKeyArgs {
    /// First author, "Family, Given" or a bare family name
    #[arg(short, long)]
    pub author: Option<String>,

    /// Publication year
    #[arg(short, long)]
    pub year: Option<String>,

    /// Keys already in use, comma-separated
    #[arg(short, long, value_delimiter = ',')]
    pub existing: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let err = Args::try_parse_from(["fulltext"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = parse(&["fulltext", "-v", "cite-key"]);
        assert_eq!(args.verbose, 1);

        let args = parse(&["fulltext", "cite-key", "-vv"]);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = parse(&["fulltext", "--quiet", "cite-key"]);
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["fulltext", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["fulltext", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_locate_requires_an_identifier() {
        let err = Args::try_parse_from(["fulltext", "locate", "--json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_locate_accepts_several_identifiers() {
        let args = parse(&["fulltext", "locate", "--doi", "10.1/x", "--pmid", "123", "--json"]);
        let Command::Locate(locate) = args.command else {
            panic!("expected locate");
        };
        assert_eq!(locate.doi.as_deref(), Some("10.1/x"));
        assert_eq!(locate.pmid.as_deref(), Some("123"));
        assert!(locate.json);
    }

    #[test]
    fn test_cli_fetch_defaults() {
        let args = parse(&["fulltext", "fetch", "https://example.org/a.pdf", "out/a.pdf"]);
        let Command::Fetch(fetch) = args.command else {
            panic!("expected fetch");
        };
        assert_eq!(fetch.kind, FetchKind::Pdf);
        assert_eq!(fetch.dest, PathBuf::from("out/a.pdf"));
        assert!(fetch.retries.is_none());
    }

    #[test]
    fn test_cli_fetch_rejects_out_of_range_retries() {
        let err = Args::try_parse_from(["fulltext", "fetch", "u", "d", "--retries", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_fetch_kind_values() {
        let args = parse(&["fulltext", "fetch", "PMC1", "a.xml", "--kind", "xml"]);
        let Command::Fetch(fetch) = args.command else {
            panic!("expected fetch");
        };
        assert_eq!(fetch.kind, FetchKind::Xml);
    }

    #[test]
    fn test_cli_convert_ids_requires_ids() {
        let err = Args::try_parse_from(["fulltext", "convert-ids"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_cite_key_existing_is_comma_separated() {
        let args = parse(&[
            "fulltext", "cite-key", "--author", "Smith, J.", "--year", "2024", "--existing",
            "smith2024,smith2024a",
        ]);
        let Command::CiteKey(cite) = args.command else {
            panic!("expected cite-key");
        };
        assert_eq!(cite.existing, vec!["smith2024", "smith2024a"]);
        assert_eq!(cite.author.as_deref(), Some("Smith, J."));
    }
}
