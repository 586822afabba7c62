use std::path::PathBuf;

use argh::FromArgs;

use crate::report::DEFAULT_REPORT_FILE;

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT_FILE)
}

#[derive(FromArgs, Debug)]
/// load price lists, search products by name and export a report. Log verbosity follows RUST_LOG.
pub struct Args {
    #[argh(option, short = 'd', default = "default_dir()")]
    /// directory scanned for *price*.csv / *price*.json files (default: current directory)
    pub dir: PathBuf,

    #[argh(option, short = 'o', default = "default_output()")]
    /// report destination; a .json extension writes JSON instead of HTML (default: output.html)
    pub output: PathBuf,
}
