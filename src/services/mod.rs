pub mod ai;
pub mod answer;
pub mod booking;
pub mod calendar;
pub mod dispatcher;
pub mod google_auth;
pub mod mail;
pub mod messaging;
pub mod relay;
