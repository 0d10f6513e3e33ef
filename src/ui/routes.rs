//! Navigation between the two surfaces

use crate::types::Route;
use std::future::Future;
use tracing::debug;

impl Route {
    /// Resolve a location like `/admin`, `#/admin` or `/admin?tab=1`.
    /// Anything unrecognized redirects to the player.
    pub fn resolve(location: &str) -> Route {
        let path = location.trim().trim_start_matches('#');
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');

        match path {
            "" => Route::Player,
            "/admin" | "admin" => Route::Admin,
            other => {
                debug!(location = other, "Unknown route, redirecting to /");
                Route::Player
            }
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Player => "/",
            Route::Admin => "/admin",
        }
    }
}

/// Mount surfaces one after another, starting at `start`.
///
/// `mount` runs a fresh mount of a surface and returns where the user went
/// next, or `None` to leave the app.
pub async fn navigate<F, Fut, E>(start: Route, mut mount: F) -> Result<(), E>
where
    F: FnMut(Route) -> Fut,
    Fut: Future<Output = Result<Option<Route>, E>>,
{
    let mut route = Some(start);
    while let Some(current) = route {
        debug!(route = current.path(), "Mounting surface");
        route = mount(current).await?;
    }
    Ok(())
}
