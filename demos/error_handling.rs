//! Shows the two failure channels: fail-fast parameter errors and
//! value-shaped remote errors.
//!
//! # Running this example
//!
//! ```bash
//! cargo run --example error_handling
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "examples report through the terminal"
)]

use cielo::{CieloError, Config, Parameters, Transaction, Value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let transaction = Transaction::new(Config::sandbox(
        "https://store.example.com/checkout/return",
    ))?;

    // Example 1: a missing required parameter is rejected locally,
    // before anything goes on the wire.
    println!("Example 1: missing required parameter");
    let mut incomplete = Parameters::new();
    incomplete.insert("valor", "8900");

    match transaction.create(&mut incomplete).await {
        Err(CieloError::MissingArgument(field)) => {
            println!("   rejected locally: missing `{field}`");
        }
        other => println!("   unexpected outcome: {other:?}"),
    }

    // Example 2: remote problems never surface as Err. An unknown tid
    // makes the webservice answer with its own error document, and a
    // connectivity failure decodes to the fixed erro/000 map — both are
    // ordinary decoded replies to branch on.
    println!("\nExample 2: remote errors arrive as decoded maps");
    let reply = transaction
        .verify(Some("0000000000000000000000"))
        .await?
        .expect("a tid was supplied");

    if let Some(erro) = reply.get("erro") {
        let codigo = erro.get("codigo").and_then(Value::as_str).unwrap_or("?");
        let mensagem = erro.get("mensagem").and_then(Value::as_str).unwrap_or("?");
        println!("   could not reach the webservice ({codigo}): {mensagem}");
    } else if let Some(codigo) = reply.get("codigo").and_then(Value::as_str) {
        let mensagem = reply.get("mensagem").and_then(Value::as_str).unwrap_or("?");
        println!("   webservice error {codigo}: {mensagem}");
    } else {
        println!("   transaction state: {reply:?}");
    }

    Ok(())
}
