use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::codec::Scheme;

#[derive(Parser, Debug)]
#[command(name = "binlock", version)]
#[command(about = "Encode, decode, encrypt and decrypt byte streams and files.")]
pub struct Cli {
    /// Input file. Read from stdin when absent.
    #[arg(global = true, short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file. Write to stdout when absent; generate a name from the
    /// input when given without a value.
    #[arg(global = true, short, long, value_name = "FILE")]
    pub output: Option<Option<PathBuf>>,

    /// Write the result back over the input file. File inputs only.
    #[arg(global = true, long)]
    pub overwrite: bool,

    /// Read passwords as lines from stdin instead of prompting a terminal.
    #[arg(global = true, long)]
    pub password_stdin: bool,

    /// More verbose output.
    #[arg(global = true, short, long)]
    pub verbose: bool,

    /// More output for debugging. Implies --verbose.
    #[arg(global = true, long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode or decode without a header or password.
    Encode {
        /// Encoder scheme.
        #[arg(short, long, value_enum, default_value = "b64")]
        encoder: Scheme,

        /// Switch to decoding. Default is encoding.
        #[arg(long)]
        decode: bool,
    },
    /// Encrypt or decrypt a password-protected container.
    Crypt {
        /// Switch to decryption. Default is encryption.
        #[arg(long)]
        decrypt: bool,

        /// Print header information and exit.
        #[arg(long)]
        dump_header: bool,
    },
}
