use crate::commands::PageSelection;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfops")]
#[command(about = "Select, reorder, split and transform the pages of PDF files")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Page selection options shared by commands that act on some pages.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Pages as a list, e.g. "[1,3,7]" or "1,3,7" (repeatable)
    #[arg(short = 'l', long = "select-list", value_name = "LIST")]
    pub lists: Vec<String>,

    /// Inclusive page range, e.g. "[2,5]" or "2-5" (repeatable)
    #[arg(short = 'r', long = "select-range", value_name = "RANGE")]
    pub ranges: Vec<String>,

    /// Single page, e.g. "4" (repeatable)
    #[arg(short = 'i', long = "select-index", value_name = "INDEX")]
    pub indices: Vec<String>,
}

impl SelectArgs {
    pub fn into_selection(self, all: bool) -> PageSelection {
        PageSelection {
            lists: self.lists,
            ranges: self.ranges,
            indices: self.indices,
            all,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server over stdio
    Mcp,

    /// Display PDF metadata
    Info {
        /// PDF file to inspect
        path: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove the selected pages
    Delete {
        /// PDF file to delete pages from
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Output file (default: <name>_deleted.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Keep only the selected pages
    Extract {
        /// PDF file to extract from
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Output file (default: <name>_extracted.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Insert all pages of a second PDF into the first
    Insert {
        /// PDF file to insert into
        path: PathBuf,

        /// PDF file whose pages are inserted
        insert: PathBuf,

        /// Page number the inserted pages start at (one past the end appends)
        #[arg(short = 'i', long = "select-index", value_name = "INDEX")]
        index: String,

        /// Output file (default: <name>_inserted.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Combine PDFs in the given order
    Merge {
        /// PDF files to merge (default: every PDF in the current directory)
        inputs: Vec<PathBuf>,

        /// Merge every PDF in the current directory, sorted by name
        #[arg(short, long)]
        all: bool,

        /// Output file (default: <first name>_merged.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split a PDF after each selected page
    #[command(alias = "burst")]
    Split {
        /// PDF file to split
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Split after every page
        #[arg(short, long)]
        all: bool,

        /// Output name pattern; pieces get a _<k> suffix (default: <name>_split.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encrypt a PDF with a password
    Encrypt {
        /// PDF file to encrypt
        path: PathBuf,

        /// Password required to open the file
        #[arg(short, long)]
        user_password: String,

        /// Password for full access (default: the user password)
        #[arg(long)]
        owner_password: Option<String>,

        /// Use 40-bit instead of 128-bit RC4
        #[arg(long = "use-40bit")]
        use_40bit: bool,

        /// Output file (default: <name>_encrypted.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove the password from an encrypted PDF
    Decrypt {
        /// PDF file to decrypt
        path: PathBuf,

        /// User or owner password
        #[arg(short, long)]
        password: String,

        /// Output file (default: <name>_decrypted.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Strip images, links or text from every page
    Remove {
        /// PDF file to clean
        path: PathBuf,

        /// Remove images
        #[arg(long)]
        images: bool,

        /// Remove link annotations
        #[arg(long)]
        links: bool,

        /// Remove text
        #[arg(long)]
        text: bool,

        /// Output file (default: <name>_removed.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Reverse the page order
    Reverse {
        /// PDF file to reverse
        path: PathBuf,

        /// Output file (default: <name>_reversed.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rotate pages clockwise
    Rotate {
        /// PDF file to rotate
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Rotate every page
        #[arg(short, long)]
        all: bool,

        /// Angle in degrees, a multiple of 90
        #[arg(long, allow_hyphen_values = true)]
        angle: i64,

        /// Output file (default: <name>_rotated.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scale pages by factors or to a size in points
    Scale {
        /// PDF file to scale
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Scale every page
        #[arg(short, long)]
        all: bool,

        /// Treat --horizontal/--vertical as width/height in points
        #[arg(long)]
        scale_to: bool,

        /// Horizontal factor, or width with --scale-to
        #[arg(long, allow_hyphen_values = true)]
        horizontal: f32,

        /// Vertical factor, or height with --scale-to
        #[arg(long, allow_hyphen_values = true)]
        vertical: f32,

        /// Output file (default: <name>_scaled.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_repeated_selection_flags() {
        let cli = Cli::parse_from([
            "pdfops", "delete", "in.pdf", "-l", "1,2", "-r", "4-5", "-i", "7", "-i", "9",
        ]);
        let Commands::Delete { select, output, .. } = cli.command else {
            panic!("expected delete");
        };
        assert_eq!(select.lists, vec!["1,2"]);
        assert_eq!(select.ranges, vec!["4-5"]);
        assert_eq!(select.indices, vec!["7", "9"]);
        assert!(output.is_none());
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::parse_from(["pdfops", "reverse", "in.pdf", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_negative_angle() {
        let cli = Cli::parse_from(["pdfops", "rotate", "in.pdf", "-a", "--angle", "-90"]);
        let Commands::Rotate { angle, all, .. } = cli.command else {
            panic!("expected rotate");
        };
        assert_eq!(angle, -90);
        assert!(all);
    }
}
