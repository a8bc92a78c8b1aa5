use clap::Parser;

use crate::zim::Namespace;

#[derive(Parser, Debug)]
#[command(name = "ruzim")]
#[command(version)]
#[command(about = "Browse and extract entries of ZIM archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  ruzim -l wiki.zim                      list article URLs\n  \
  ruzim -p wiki.zim index.html | less    print an article to stdout\n  \
  ruzim -s orbit wiki.zim                suggest entries similar to `orbit`\n  \
  ruzim -c wiki.zim                      verify the embedded MD5 checksum")]
pub struct Cli {
    /// ZIM file path
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Entry URLs to extract (default: none)
    #[arg(value_name = "URLS")]
    pub urls: Vec<String>,

    /// List entries (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List entries verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Write blob contents to stdout, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract blobs into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Namespace to operate in (single ASCII character)
    #[arg(short = 'N', value_name = "NS", default_value = "A")]
    pub namespace: String,

    /// Print suggestions for a URL or title prefix
    #[arg(short = 's', value_name = "PREFIX")]
    pub suggest: Option<String>,

    /// Print the archive metadata
    #[arg(short = 'm')]
    pub show_metadata: bool,

    /// Validate the embedded MD5 checksum
    #[arg(short = 'c')]
    pub check: bool,

    /// Quiet mode
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    /// Namespace selected with `-N`, defaulting to the article namespace.
    pub fn selected_namespace(&self) -> Namespace {
        self.namespace
            .bytes()
            .next()
            .map(Namespace)
            .unwrap_or(Namespace::ARTICLES)
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }
}
