pub mod images;
pub mod mailer;
