use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tempmail_client_rs::{
    format_received, Config, Error, HttpProvisioningService, MailboxController, Message,
    ProvisioningService,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "tempmail-client",
    about = "Interact with disposable TempMail inboxes (unofficial)",
    arg_required_else_help = true
)]
struct Cli {
    #[arg(long, help = "Backend base URL (default http://localhost:3000)")]
    base_url: Option<String>,

    #[arg(long, help = "Proxy URL (optional)")]
    proxy: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Provision a fresh disposable address
    Address,
    /// List messages held for an inbox credential
    List {
        #[arg(long)]
        token: String,
        #[arg(long)]
        details: bool,
    },
    /// Run a live session: poll the inbox, rotate on expiry, print new mail
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let provisioner = Arc::new(HttpProvisioningService::new(Some(build_config(&cli)))?);

    match cli.command {
        Commands::Address => {
            let provisioned = provisioner.create_address().await?;
            println!("Address: {}", provisioned.address);
            println!("Token:   {}", provisioned.credential);
        }
        Commands::List { token, details } => {
            let raw = provisioner.list_messages(&token).await?;
            if raw.is_empty() {
                println!("No messages found.");
            } else {
                println!("Found {} message(s):", raw.len());
                for (idx, record) in raw.into_iter().enumerate() {
                    let msg = Message::from_raw(record);
                    println!("{}. {}", idx + 1, msg.subject);
                    if details {
                        println!("   ID: {}", msg.id);
                        println!("   From: {}", msg.sender);
                        println!("   Received: {}", format_received(&msg.received_at));
                    }
                }
            }
        }
        Commands::Watch => {
            let controller = MailboxController::new(provisioner);
            controller.start().await;
            watch(&controller).await;
        }
    }

    Ok(())
}

async fn watch(controller: &MailboxController) {
    let mut last_address = String::new();
    let mut last_error = None;
    let mut seen = 0usize;

    loop {
        let snapshot = controller.snapshot();

        if snapshot.address != last_address && !snapshot.address.is_empty() {
            println!("Mailbox: {} (expires in {})", snapshot.address, snapshot.countdown);
            last_address = snapshot.address.clone();
            seen = 0;
        }
        if snapshot.error != last_error {
            if let Some(error) = &snapshot.error {
                eprintln!("Error: {error}");
            }
            last_error = snapshot.error.clone();
        }
        if snapshot.messages.len() > seen {
            for msg in &snapshot.messages[..snapshot.messages.len() - seen] {
                println!(
                    "[{}] {} — {} ({})",
                    snapshot.countdown,
                    msg.sender,
                    msg.subject,
                    format_received(&msg.received_at)
                );
            }
            seen = snapshot.messages.len();
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

fn build_config(cli: &Cli) -> Config {
    let mut cfg = Config::default();
    if let Some(base_url) = &cli.base_url {
        cfg.base_url = base_url.clone();
    }
    cfg.proxy_url = cli.proxy.clone();
    cfg
}
