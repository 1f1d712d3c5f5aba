mod handler;

use clap::Args;

pub use handler::handle_command as negotiate_handler;
pub use handler::negotiate;

#[derive(Args, Clone)]
pub struct NegotiateArgs {
    /// Accept profiles, in preference order
    #[arg(value_name = "PROFILE")]
    pub profiles: Vec<String>,
}
