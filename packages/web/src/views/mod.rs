mod home;
pub use home::Home;

mod auth_page;
pub use auth_page::AuthPage;
