use axum::routing::post;
use axum::Router;

use crate::handlers::uploads;
use crate::state::AppState;

/// Routes mounted at `/uploads`. The caller sets the body limit.
///
/// ```text
/// POST   /                        -> upload_images (multipart, field "files")
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(uploads::upload_images))
}
