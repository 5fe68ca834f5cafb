//! Command-line interface definitions.

use std::path::PathBuf;

use clap::Parser;
use svelteesp32_pack::config::SizeLimit;
use svelteesp32_pack::Options;

/// Pack a built web application into a Rust module served from flash.
///
/// Every option may also be set in `.svelteesp32rc.json`; values given here
/// take precedence.
#[derive(Parser, Debug, Clone, Default)]
#[command(about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Target server: async, pool or espidf
    #[arg(short, long)]
    pub engine: Option<String>,

    /// Directory holding the built web application
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub sourcepath: Option<String>,

    /// Generated Rust module
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub outputfile: Option<String>,

    /// Emit ETags and answer conditional requests: true, false or compiler
    #[arg(long)]
    pub etag: Option<String>,

    /// Embed gzip-compressed files: true, false or compiler
    #[arg(long)]
    pub gzip: Option<String>,

    /// Cache-Control max-age in seconds
    #[arg(long)]
    pub cachetime: Option<u64>,

    /// Record the creation time in the generated module
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub created: Option<bool>,

    /// Version string exposed as <DEFINE>_VERSION
    #[arg(long = "version")]
    pub version: Option<String>,

    /// Name of the generated registration function
    #[arg(long)]
    pub espmethod: Option<String>,

    /// Prefix of the generated constants
    #[arg(long)]
    pub define: Option<String>,

    /// Exclude files matching a glob (repeatable, comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// URL prefix for every route, e.g. /ui
    #[arg(long)]
    pub basepath: Option<String>,

    /// Maximum total size of the original files (e.g. 400k)
    #[arg(long)]
    pub maxsize: Option<String>,

    /// Maximum total size of the stored files (e.g. 150k)
    #[arg(long)]
    pub maxgzipsize: Option<String>,

    /// Accept a bundle without an entry document
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub noindexcheck: Option<bool>,

    /// File name of the entry document
    #[arg(long)]
    pub entry: Option<String>,

    /// Maximum number of stylesheets
    #[arg(long)]
    pub maxcss: Option<usize>,

    /// Serve the entry document for unknown HTML navigations
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub spafallback: Option<bool>,

    /// Run every check and print the summary without writing
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub dryrun: Option<bool>,

    /// Explicit rc file instead of searching the working and home directories
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The packing options set on the command line.
    pub fn options(&self) -> Options {
        Options {
            engine: self.engine.clone(),
            sourcepath: self.sourcepath.clone(),
            outputfile: self.outputfile.clone(),
            espmethod: self.espmethod.clone(),
            define: self.define.clone(),
            gzip: self.gzip.clone(),
            etag: self.etag.clone(),
            cachetime: self.cachetime,
            created: self.created,
            version: self.version.clone(),
            exclude: (!self.exclude.is_empty()).then(|| self.exclude.clone()),
            basepath: self.basepath.clone(),
            maxsize: self.maxsize.clone().map(SizeLimit::Text),
            maxgzipsize: self.maxgzipsize.clone().map(SizeLimit::Text),
            noindexcheck: self.noindexcheck,
            dryrun: self.dryrun,
            entry: self.entry.clone(),
            maxcss: self.maxcss,
            spafallback: self.spafallback,
        }
    }
}
