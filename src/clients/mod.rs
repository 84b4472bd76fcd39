pub mod email;
pub mod shopify;
pub mod stripe;

pub use email::EmailClient;
pub use shopify::ShopifyClient;
pub use stripe::StripeClient;
