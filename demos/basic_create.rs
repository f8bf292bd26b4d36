//! Minimal Buy Page Cielo flow: create a transaction in the sandbox and
//! print the decoded reply.
//!
//! # Running this example
//!
//! ```bash
//! cargo run --example basic_create
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "examples report through the terminal"
)]

use cielo::{Config, Parameters, Transaction, Value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let transaction = Transaction::new(Config::sandbox(
        "https://store.example.com/checkout/return",
    ))?;

    // Amounts are in cents: 8900 buys something for R$ 89,00.
    let mut params = Parameters::new();
    params.insert("numero", "178148599");
    params.insert("valor", "8900");
    params.insert("bandeira", "visa");

    let reply = transaction.create(&mut params).await?;

    match reply.get("tid").and_then(Value::as_str) {
        Some(tid) => {
            println!("transaction created, tid: {tid}");
            if let Some(url) = reply.get("url_autenticacao").and_then(Value::as_str) {
                println!("send the buyer to: {url}");
            }
            println!("full reply:\n{}", serde_json::to_string_pretty(&reply)?);
        }
        None => {
            eprintln!(
                "webservice refused the request:\n{}",
                serde_json::to_string_pretty(&reply)?
            );
        }
    }

    Ok(())
}
