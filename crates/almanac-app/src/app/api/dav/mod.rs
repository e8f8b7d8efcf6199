// CalDAV request handling.
//
// The dispatcher owns the per-method policy (auth gate, resource requirement,
// success status); method handlers only talk to the collaborators.

use salvo::Router;

pub mod dispatch;
pub mod extract;
pub mod method;
pub mod response;

#[cfg(test)]
pub(crate) mod test_support;

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .goal(dispatch::Dispatcher)
        .push(Router::with_path("{**rest}").goal(dispatch::Dispatcher))
}
