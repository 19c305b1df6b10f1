pub mod ticket_client;

pub use ticket_client::JiraTicketClient;
