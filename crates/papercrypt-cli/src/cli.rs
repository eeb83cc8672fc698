use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use papercrypt_core::VERSION;

/// PaperCrypt - encrypted documents for printing on paper
#[derive(Parser)]
#[command(name = "papercrypt")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the config file
    #[arg(long, global = true, env = "PAPERCRYPT_CONFIG")]
    pub config: Option<String>,
}

/// Arguments for the `generate` command
#[derive(Args)]
pub struct GenerateArgs {
    /// Plaintext input file (stdin when omitted or "-")
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<String>,

    /// Output file for the document (stdout when omitted or "-")
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,

    /// Serial number (generated when omitted)
    #[arg(short, long, value_name = "SERIAL")]
    pub serial_number: Option<String>,

    /// Purpose of the document
    #[arg(short, long)]
    pub purpose: Option<String>,

    /// Comment printed on the document
    #[arg(short, long)]
    pub comment: Option<String>,

    /// Creation date (RFC 3339, "YYYY-MM-DD HH:MM:SS" or YYYY-MM-DD, UTC)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Render the body as an ASCII armor block instead of hex
    #[arg(long, conflicts_with = "hex")]
    pub armor: bool,

    /// Render the body as hex (overrides `armor = true` in the config)
    #[arg(long)]
    pub hex: bool,

    /// Use lower-case hex digits
    #[arg(long)]
    pub lowercase: bool,

    /// Do not embed a QR code of the payload
    #[arg(long)]
    pub no_qr: bool,

    /// Produce a PDF instead of text (not supported by this build)
    #[arg(long)]
    pub pdf: bool,
}

/// Arguments for the `qr` command
#[derive(Args)]
pub struct QrArgs {
    /// QR image or JSON payload (stdin when omitted or "-")
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Output file (stdout when omitted or "-")
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,

    /// Input is JSON scanned by another reader, not an image
    #[arg(long)]
    pub from_json: bool,

    /// Emit the raw JSON payload instead of the text document
    #[arg(long)]
    pub to_json: bool,
}

/// Arguments for the `decode` command
#[derive(Args)]
pub struct DecodeArgs {
    /// Text document or JSON payload (stdin when omitted or "-")
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Output file for the plaintext (stdout when omitted or "-")
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,

    /// Verify the document without decrypting it
    #[arg(long)]
    pub verify_only: bool,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt data and render it as a printable document
    #[command(visible_alias = "g")]
    Generate(GenerateArgs),

    /// Read a document from a QR code image or its JSON payload
    #[command(visible_alias = "q")]
    Qr(QrArgs),

    /// Verify a document and decrypt its contents
    #[command(visible_alias = "d")]
    Decode(DecodeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
