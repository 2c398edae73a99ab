//! Support ticket commands.

use nivasity_core::TicketId;

use super::build_client;

/// List the signed-in student's tickets.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let tickets = client.tickets().await?;

    if tickets.is_empty() {
        println!("No tickets.");
        return Ok(());
    }

    for ticket in &tickets {
        println!(
            "{:>6}  {:<10} {:<50} {}",
            ticket.id,
            format!("{:?}", ticket.status).to_lowercase(),
            ticket.subject,
            ticket.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}

/// Open a new ticket.
pub async fn open(subject: &str, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let ticket = client.open_ticket(subject, message).await?;
    println!("Opened ticket {}: {}", ticket.id, ticket.subject);
    Ok(())
}

/// Show a ticket's conversation.
pub async fn show(id: TicketId) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let messages = client.ticket_messages(id).await?;

    for message in &messages {
        let who = if message.from_support { "support" } else { "you" };
        println!(
            "[{}] {}: {}",
            message.created_at.format("%Y-%m-%d %H:%M"),
            who,
            message.body
        );
    }
    Ok(())
}

/// Reply to a ticket.
pub async fn reply(id: TicketId, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let sent = client.reply_ticket(id, message).await?;
    println!("Sent reply {} to ticket {}", sent.id, id);
    Ok(())
}
