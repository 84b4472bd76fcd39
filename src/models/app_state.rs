use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;

use crate::clients::{EmailClient, ShopifyClient};
use crate::config::app_config::AppConfig;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub email: EmailClient,
    pub shopify: ShopifyClient,
}
