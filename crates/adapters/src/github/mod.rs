pub mod alert_client;

pub use alert_client::GithubAlertClient;
