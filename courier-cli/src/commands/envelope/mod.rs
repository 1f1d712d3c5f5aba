mod handler;

use clap::{Args, Subcommand};

pub use handler::handle_commands as envelope_handler;

#[derive(Args, Clone)]
pub struct EnvelopeArgs {
    #[command(subcommand)]
    pub commands: EnvelopeCommands,
}

#[derive(Subcommand, Clone)]
#[command(subcommand_help_heading = "Envelope")]
pub enum EnvelopeCommands {
    /// Print the envelope type of a packed message
    Detect {
        #[arg(value_name = "FILE", required = true)]
        file: String,
    },

    /// Pack a JSON message file into a plain envelope
    PackPlain {
        #[arg(value_name = "FILE", required = true)]
        file: String,
    },

    /// Unpack a plain envelope and print its message
    UnpackPlain {
        #[arg(value_name = "FILE", required = true)]
        file: String,
    },
}
