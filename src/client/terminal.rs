use super::{ ChatSession, RelayClient };
use crate::cli::ChatArgs;

use std::error::Error;
use std::time::Duration;
use tokio::io::{ AsyncBufReadExt, AsyncWriteExt, BufReader };

const PROMPT: &str = "> ";

/// Interactive loop over stdin/stdout. `/reset` drops the current document
/// and uploads the file again, `/quit` exits.
pub async fn run_chat(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let client = RelayClient::new(&args.server_url, Duration::from_secs(args.timeout_secs))?;
    let mut chat = ChatSession::new(client);
    let mut stdout = tokio::io::stdout();

    upload(&mut chat, &args, &mut stdout).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    stdout.write_all(PROMPT.as_bytes()).await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/reset" => {
                chat.reset();
                upload(&mut chat, &args, &mut stdout).await?;
            }
            text => {
                if let Some(reply) = chat.ask(text).await? {
                    let out = format!("assistant: {}\n", reply.content());
                    stdout.write_all(out.as_bytes()).await?;
                }
            }
        }
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}

async fn upload(
    chat: &mut ChatSession,
    args: &ChatArgs,
    stdout: &mut tokio::io::Stdout,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    stdout.write_all(format!("Uploading {}...\n", args.file.display()).as_bytes()).await?;
    stdout.flush().await?;

    match chat.upload(&args.file).await {
        Ok(source) => {
            let msg = format!("Ready. Source {}. Ask a question, /reset or /quit.\n", source.id());
            stdout.write_all(msg.as_bytes()).await?;
            Ok(())
        }
        Err(e) => Err(e.upload_message().into()),
    }
}
