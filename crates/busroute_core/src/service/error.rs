//! Error taxonomy shared by route use-case services.
//!
//! Every variant carries the offending id or field so callers can act on the
//! failure without re-reading the store.

use crate::model::route::{RouteId, RouteStopId};
use crate::model::stop::StopId;
use crate::repo::route_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, RouteServiceError>;

/// Coarse classification of service failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced route, stop or route stop does not exist.
    NotFound,
    /// Input is missing, malformed, or targets a route in the wrong state.
    InvalidArgument,
    /// The store failed underneath the operation.
    Storage,
}

/// Errors from merge, publish, delete-draft and catalog operations.
#[derive(Debug)]
pub enum RouteServiceError {
    /// Required text field is blank after trim.
    BlankField(&'static str),
    /// Donor selection has no route-stop ids.
    EmptySelection,
    /// Base and donor route ids are equal.
    SameBaseAndDonor(RouteId),
    /// Merge strategy name is not recognized.
    UnknownStrategy(String),
    RouteNotFound(RouteId),
    StopNotFound(StopId),
    RouteStopNotFound(RouteStopId),
    /// A selected route stop belongs to a route other than the donor.
    ForeignRouteStop {
        route_stop_id: RouteStopId,
        donor_route_id: RouteId,
        owner_route_id: RouteId,
    },
    /// Draft-only operation applied to a published route.
    NotADraft(RouteId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl RouteServiceError {
    /// Classifies this error for callers that map failures to responses.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RouteNotFound(_) | Self::StopNotFound(_) | Self::RouteStopNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::BlankField(_)
            | Self::EmptySelection
            | Self::SameBaseAndDonor(_)
            | Self::UnknownStrategy(_)
            | Self::ForeignRouteStop { .. }
            | Self::NotADraft(_) => ErrorKind::InvalidArgument,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }
}

impl Display for RouteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::EmptySelection => write!(f, "donor selection must have at least 1 route stop"),
            Self::SameBaseAndDonor(id) => {
                write!(f, "donor route cannot equal base route: {id}")
            }
            Self::UnknownStrategy(value) => write!(f, "unknown merge strategy: `{value}`"),
            Self::RouteNotFound(id) => write!(f, "route not found: {id}"),
            Self::StopNotFound(id) => write!(f, "stop not found: {id}"),
            Self::RouteStopNotFound(id) => write!(f, "route stop not found: {id}"),
            Self::ForeignRouteStop {
                route_stop_id,
                donor_route_id,
                owner_route_id,
            } => write!(
                f,
                "route stop {route_stop_id} belongs to route {owner_route_id}, not donor route {donor_route_id}"
            ),
            Self::NotADraft(id) => write!(f, "route is not a draft: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RouteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RouteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::RouteNotFound(id) => Self::RouteNotFound(id),
            other => Self::Repo(other),
        }
    }
}
