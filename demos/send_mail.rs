//! Sends a message through the v3.1 Send API, then lists the account's senders.
//!
//! Reads the API keys from `MJ_APIKEY_PUBLIC` and `MJ_APIKEY_PRIVATE`, and the
//! addresses from `MJ_FROM` and `MJ_TO`.
//!
//! Run with: `cargo run --example send_mail`

use mailjet::request::{filter, sort, SortOrder};
use mailjet::resources::Sender;
use mailjet::send::{InfoMessagesV31, MessagesV31, RecipientV31};
use mailjet::{Client, DebugLevel, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("mailjet=debug,send_mail=info")
        .init();

    let public_key = std::env::var("MJ_APIKEY_PUBLIC").unwrap_or_default();
    let private_key = std::env::var("MJ_APIKEY_PRIVATE").unwrap_or_default();
    let from = std::env::var("MJ_FROM").unwrap_or_else(|_| "pilot@mailjet.com".to_string());
    let to = std::env::var("MJ_TO").unwrap_or_else(|_| "passenger@mailjet.com".to_string());

    let client = Client::builder(public_key, private_key)
        .debug_level(DebugLevel::Headers)
        .build()?;

    println!("=== Send ===");
    let messages = MessagesV31 {
        messages: vec![InfoMessagesV31 {
            from: Some(RecipientV31::named(from, "Mailjet Pilot")),
            to: vec![RecipientV31::new(to)],
            subject: "Your email flight plan!".to_string(),
            text_part: "Dear passenger, welcome to Mailjet! May the delivery force be with you!"
                .to_string(),
            custom_id: "send_mail-demo".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    };

    match client.send_mail_v31(&messages).await {
        Ok(results) => {
            for result in &results.results {
                println!("{} ({})", result.status, result.custom_id);
                for recipient in &result.to {
                    println!("  {} -> message {}", recipient.email, recipient.message_id);
                }
            }
        }
        Err(Error::SendRejected(feedback)) => {
            for error in feedback.errors() {
                println!("rejected: {} {} {:?}", error.error_code, error.error_message, error.error_related_to);
            }
        }
        Err(e) => println!("send failed: {}", e),
    }

    println!("\n=== Senders ===");
    let senders = client
        .list::<Vec<Sender>>(
            "sender",
            &[filter("Limit", "10"), sort("CreatedAt", SortOrder::Descending)],
        )
        .await?;

    println!("{} of {} senders:", senders.count, senders.total);
    for sender in senders.iter() {
        println!("  {} [{}]", sender.email, sender.status);
    }
    println!("Request took {:?}", senders.latency);

    Ok(())
}
