mod handler;

use clap::{Args, Subcommand};

pub use handler::handle_commands as profile_handler;

#[derive(Args, Clone)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub commands: ProfileCommands,
}

#[derive(Subcommand, Clone)]
#[command(subcommand_help_heading = "Profile")]
pub enum ProfileCommands {
    /// Parse an accept profile and print its structured form
    Parse {
        #[arg(required = true)]
        profile: String,
    },

    /// Build an accept profile string
    Build {
        #[arg(long, required = true)]
        env: String,

        #[arg(long, value_delimiter = ',')]
        circuits: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        alg: Vec<String>,
    },
}
