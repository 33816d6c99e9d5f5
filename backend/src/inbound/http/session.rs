//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix cookie session so handlers deal in a user id and an
//! admin flag rather than raw string keys.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::domain::Error;

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ADMIN_KEY: &str = "is_admin";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id and admin flag.
    pub fn persist_user(&self, user_id: Uuid, is_admin: bool) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))?;
        self.0
            .insert(ADMIN_KEY, is_admin)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop the session, logging the user out.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<Uuid>, Error> {
        self.0
            .get::<Uuid>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<Uuid, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Whether the session belongs to the admin account.
    pub fn is_admin(&self) -> Result<bool, Error> {
        Ok(self
            .0
            .get::<bool>(ADMIN_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?
            .unwrap_or(false))
    }

    /// Require the admin account or return `403 Forbidden`.
    pub fn require_admin(&self) -> Result<Uuid, Error> {
        let user_id = self.require_user_id()?;
        if self.is_admin()? {
            Ok(user_id)
        } else {
            Err(Error::forbidden("admin access required"))
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
