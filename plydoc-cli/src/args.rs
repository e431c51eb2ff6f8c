//! Defines `Args` which is used to parse command line arguments.

use std::{path::PathBuf, str::FromStr};

use structopt::StructOpt;
use plydoc::Encoding;


#[derive(StructOpt, Debug)]
#[structopt(raw(setting = "structopt::clap::AppSettings::VersionlessSubcommands"))]
pub struct Args {
    #[structopt(flatten)]
    pub global: GlobalArgs,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(StructOpt, Debug)]
pub struct GlobalArgs {
    /// Print debug log messages of the PLY reader and writer to stderr.
    /// Ignored if `RUST_LOG` is set.
    #[structopt(short = "-v", long = "--verbose")]
    pub verbose: bool,
}

#[derive(StructOpt, Debug)]
pub enum Command {
    /// Print information about a PLY file.
    #[structopt(name = "info")]
    Info {
        #[structopt(flatten)]
        args: InfoArgs,
    },

    /// Converts a PLY file into another encoding.
    #[structopt(name = "convert")]
    Convert {
        #[structopt(flatten)]
        args: ConvertArgs,
    },
}

#[derive(StructOpt, Debug)]
pub struct ConvertArgs {
    /// Specify the target file encoding. Valid values: 'binary' (native
    /// endianess), 'bbe' (binary big endian), 'ble' (binary little endian) and
    /// 'ascii'. Only the native byte order can be written.
    #[structopt(
        short = "-e",
        long = "--target-encoding",
        default_value = "binary",
    )]
    pub target_encoding: EncodingRequest,

    /// Path to the source PLY file.
    #[structopt(parse(from_os_str))]
    pub source: PathBuf,

    /// Path to the target PLY file. Files are not overwritten by default.
    #[structopt(parse(from_os_str))]
    pub target: PathBuf,

    /// Overwrite the target file if it already exists.
    #[structopt(long = "--force")]
    pub force: bool,

    /// Add a comment line to the header of the target file (in addition to
    /// the comments of the source file). Can be given multiple times.
    #[structopt(long = "--comment")]
    pub comments: Vec<String>,

    /// If set, header comments of the source file are not copied.
    #[structopt(long = "--drop-comments")]
    pub drop_comments: bool,
}


#[derive(StructOpt, Debug)]
pub struct InfoArgs {
    /// If specified, only the header (and not the body) of the file will be
    /// read. Reading the body has the advantage of checking whether the file
    /// is completely valid.
    #[structopt(long = "--header-only")]
    pub header_only: bool,

    /// Number of vertex positions to print (if the file has a `vertex`
    /// element with `x`, `y` and `z` properties).
    #[structopt(
        short = "-n",
        long = "--values",
        default_value = "5",
    )]
    pub values: usize,

    /// Path to the PLY file.
    #[structopt(parse(from_os_str))]
    pub file: PathBuf,
}

/// The target encoding as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingRequest {
    Ascii,
    Binary,
    BinaryBigEndian,
    BinaryLittleEndian,
}

impl EncodingRequest {
    pub fn encoding(self) -> Encoding {
        match self {
            EncodingRequest::Ascii => Encoding::Ascii,
            EncodingRequest::Binary => Encoding::binary_native(),
            EncodingRequest::BinaryBigEndian => Encoding::BinaryBigEndian,
            EncodingRequest::BinaryLittleEndian => Encoding::BinaryLittleEndian,
        }
    }
}

impl FromStr for EncodingRequest {
    type Err = String;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        match src {
            "ascii" => Ok(EncodingRequest::Ascii),
            "binary" => Ok(EncodingRequest::Binary),
            "bbe" => Ok(EncodingRequest::BinaryBigEndian),
            "ble" => Ok(EncodingRequest::BinaryLittleEndian),
            other => Err(format!("'{}' is not a valid encoding", other)),
        }
    }
}
