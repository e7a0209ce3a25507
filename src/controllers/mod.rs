pub mod bookings;
#[cfg(feature = "gallery")]
pub mod gallery;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    let router = Router::new().merge(bookings::routes());

    #[cfg(feature = "gallery")]
    let router = router.merge(gallery::routes());

    router
}
