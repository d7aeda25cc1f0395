//! Commands queued from the UI to the backend worker, and the events it
//! answers with.

use client_core::ClientError;
use shared::{
    domain::{Category, Child, UserProfile},
    protocol::{Credentials, ProfileInfoUpdate, Session},
};

use crate::submission::SubmitTicket;

#[derive(Debug, Clone)]
pub enum BackendCommand {
    Login {
        ticket: SubmitTicket,
        credentials: Credentials,
        remember: bool,
    },
    LoadCategories,
    LoadProfile,
    SubmitChildren {
        ticket: SubmitTicket,
        children: Vec<Child>,
    },
    UpdateProfile {
        ticket: SubmitTicket,
        info: ProfileInfoUpdate,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::LoadCategories => "load_categories",
            Self::LoadProfile => "load_profile",
            Self::SubmitChildren { .. } => "submit_children",
            Self::UpdateProfile { .. } => "update_profile",
        }
    }
}

#[derive(Debug, Clone)]
pub enum BackendEvent {
    WorkerFailed(String),
    LoginFinished {
        ticket: SubmitTicket,
        result: Result<Session, ClientError>,
    },
    CategoriesLoaded(Result<Vec<Category>, ClientError>),
    ProfileLoaded(Result<UserProfile, ClientError>),
    ChildrenSubmitted {
        ticket: SubmitTicket,
        result: Result<(), ClientError>,
    },
    ProfileUpdated {
        ticket: SubmitTicket,
        result: Result<UserProfile, ClientError>,
    },
}
