use rst_common::with_logging::log::debug;

use crate::commands::handler::ContextHandler;
use crate::types::CliError;

use super::NegotiateArgs;

pub fn negotiate(ctx: &ContextHandler, profiles: &[String]) -> Result<String, CliError> {
    let selected = ctx
        .registry()
        .negotiate(profiles)
        .map_err(|err| CliError::ProfileError(err.to_string()))?;

    Ok(selected.to_string())
}

pub async fn handle_command(ctx: &ContextHandler, args: NegotiateArgs) -> Result<(), CliError> {
    debug!(
        "[negotiate] supported profiles: {:?}",
        ctx.registry().supported_profiles()
    );

    println!("{}", negotiate(ctx, &args.profiles)?);
    Ok(())
}
