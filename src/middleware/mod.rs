/// Viewer identity extractors
///
/// Session handling lives upstream: the auth layer resolves the session and
/// forwards the viewer identity as a request header. Handlers declare whether
/// they require a viewer ([`Viewer`]) or merely use one when present
/// ([`MaybeViewer`]); an absent identity on a required endpoint turns into a
/// redirect to the login entry point, never an error page.
use actix_web::{FromRequest, HttpRequest};
use std::convert::Infallible;
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

/// Where unauthenticated viewers are redirected
pub const LOGIN_URL: &str = "/auth/login/";

/// Header carrying the authenticated user id, set by the auth layer
pub const VIEWER_HEADER: &str = "X-User-Id";

fn viewer_from(req: &HttpRequest) -> Option<Uuid> {
    req.headers()
        .get(VIEWER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
}

/// Authenticated viewer; extraction fails with a login redirect when absent
#[derive(Debug, Clone, Copy)]
pub struct Viewer(pub Uuid);

impl FromRequest for Viewer {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(viewer_from(req).map(Viewer).ok_or(AppError::Unauthorized))
    }
}

/// Viewer if authenticated; anonymous requests extract as `None`
#[derive(Debug, Clone, Copy)]
pub struct MaybeViewer(pub Option<Uuid>);

impl FromRequest for MaybeViewer {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(MaybeViewer(viewer_from(req))))
    }
}
