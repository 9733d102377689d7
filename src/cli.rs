use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "runtar")]
#[command(version)]
#[command(about = "A read-only tar navigator with HTTP URL support", long_about = None)]
#[command(after_help = "Examples:\n  \
  runtar data.tar                      validate data.tar and report its entry count\n  \
  runtar -l data.tar dir/              list the direct children of dir/\n  \
  runtar -p data.tar dir/notes.txt     print notes.txt to stdout\n  \
  runtar -t https://example.com/a.tar etc/   query entry type in a remote archive")]
pub struct Cli {
    /// Tar file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Entry path inside the archive
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Validate the archive (default when no other mode is given)
    #[arg(short = 'c')]
    pub check: bool,

    /// List the direct children of directory PATH
    #[arg(short = 'l')]
    pub list: bool,

    /// Print the contents of file PATH to stdout
    #[arg(short = 'p')]
    pub print: bool,

    /// Report whether PATH exists and its type
    #[arg(short = 't')]
    pub type_of: bool,

    /// Byte offset to start reading from (with -p)
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub offset: u64,

    /// Maximum number of entries to list (with -l)
    #[arg(long, value_name = "N", default_value_t = 4096)]
    pub limit: usize,

    /// Quiet mode, suppress diagnostics
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }
}
