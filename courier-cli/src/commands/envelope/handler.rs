use rst_common::with_logging::log::debug;
use rstdev_domain::entity::ToJSON;

use prople_courier_core::envelope::{EnvelopeType, Message};
use prople_courier_core::packer::PackerParams;

use crate::commands::handler::{read_file, ContextHandler};
use crate::types::CliError;

use super::EnvelopeCommands;

pub fn detect(ctx: &ContextHandler, envelope: &[u8]) -> Result<EnvelopeType, CliError> {
    ctx.registry()
        .detect_envelope_type(envelope)
        .map_err(|err| CliError::PackerError(err.to_string()))
}

pub async fn pack_plain(ctx: &ContextHandler, content: Vec<u8>) -> Result<Vec<u8>, CliError> {
    let message =
        Message::try_from(content).map_err(|err| CliError::EnvelopeError(err.to_string()))?;

    ctx.registry()
        .pack(EnvelopeType::Plain, &message, &PackerParams::Plain)
        .await
        .map_err(|err| CliError::PackerError(err.to_string()))
}

pub async fn unpack_plain(ctx: &ContextHandler, envelope: &[u8]) -> Result<Message, CliError> {
    let (message, env) = ctx
        .registry()
        .unpack(envelope)
        .await
        .map_err(|err| CliError::PackerError(err.to_string()))?;

    debug!("[envelope:unpack] unpacked {} envelope", env);
    Ok(message)
}

fn to_text(bytes: Vec<u8>) -> Result<String, CliError> {
    String::from_utf8(bytes).map_err(|err| CliError::EnvelopeError(err.to_string()))
}

pub async fn handle_commands(
    ctx: &ContextHandler,
    commands: EnvelopeCommands,
) -> Result<(), CliError> {
    debug!("envelope command handler triggered...");

    match commands {
        EnvelopeCommands::Detect { file } => {
            let envelope = read_file(&file).await?;
            println!("{}", detect(ctx, &envelope)?);
        }
        EnvelopeCommands::PackPlain { file } => {
            let content = read_file(&file).await?;
            let packed = pack_plain(ctx, content).await?;
            println!("{}", to_text(packed)?);
        }
        EnvelopeCommands::UnpackPlain { file } => {
            let envelope = read_file(&file).await?;
            let message = unpack_plain(ctx, &envelope).await?;
            let json = message
                .to_json()
                .map_err(|err| CliError::EnvelopeError(err.to_string()))?;
            println!("{}", json);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rst_common::with_tokio::tokio;

    const MESSAGE: &str = r#"{
        "id": "7f0a1c2e",
        "type": "https://didcomm.org/discover-features/2.0/queries",
        "from": "did:example:alice",
        "body": {"queries": [{"feature-type": "accept"}]}
    }"#;

    #[tokio::test]
    async fn test_pack_detect_unpack() {
        let ctx = ContextHandler::new(None).unwrap();

        let packed = pack_plain(&ctx, MESSAGE.as_bytes().to_vec()).await;
        assert!(!packed.is_err());

        let packed = packed.unwrap();
        assert_eq!(detect(&ctx, &packed).unwrap(), EnvelopeType::Plain);

        let message = unpack_plain(&ctx, &packed).await;
        assert!(!message.is_err());

        let message = message.unwrap();
        assert_eq!(message.id(), "7f0a1c2e");
        assert_eq!(message.typ(), Some(EnvelopeType::Plain))
    }

    #[tokio::test]
    async fn test_handle_envelope_commands() {
        let ctx = ContextHandler::new(None).unwrap();
        let dir = std::env::temp_dir();

        let message_file = dir.join("courier-cli-envelope-message.json");
        tokio::fs::write(&message_file, MESSAGE).await.unwrap();

        let packed = pack_plain(&ctx, MESSAGE.as_bytes().to_vec()).await.unwrap();
        let envelope_file = dir.join("courier-cli-envelope-packed.json");
        tokio::fs::write(&envelope_file, &packed).await.unwrap();

        let commands = vec![
            EnvelopeCommands::PackPlain {
                file: message_file.display().to_string(),
            },
            EnvelopeCommands::Detect {
                file: envelope_file.display().to_string(),
            },
            EnvelopeCommands::UnpackPlain {
                file: envelope_file.display().to_string(),
            },
        ];

        for command in commands {
            assert!(!handle_commands(&ctx, command).await.is_err())
        }

        let missing = EnvelopeCommands::Detect {
            file: dir.join("courier-cli-missing.json").display().to_string(),
        };
        assert!(matches!(
            handle_commands(&ctx, missing).await.unwrap_err(),
            CliError::IOError(_)
        ))
    }

    #[tokio::test]
    async fn test_detect_garbage() {
        let ctx = ContextHandler::new(None).unwrap();
        let detected = detect(&ctx, b"garbage");
        assert!(matches!(detected.unwrap_err(), CliError::PackerError(_)))
    }

    #[tokio::test]
    async fn test_pack_invalid_message() {
        let ctx = ContextHandler::new(None).unwrap();
        let packed = pack_plain(&ctx, b"{\"id\": 1}".to_vec()).await;
        assert!(matches!(packed.unwrap_err(), CliError::EnvelopeError(_)))
    }
}
