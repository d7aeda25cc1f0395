use super::{parse_child, run_children, run_profile, Cli, Command, Cx, LoginArgs};

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use clap::Parser;
use client_core::{ClientError, MarketplaceApi};
use shared::{
    domain::{Category, Child, Locale, Sex, UserProfile},
    protocol::{Credentials, ProfileInfoUpdate, Session},
};

/// Signs anyone in, then refuses every write.
struct RejectingApi;

fn rejected(status: u16) -> ClientError {
    ClientError::Status {
        status,
        message: "Validation error(s)".into(),
    }
}

#[async_trait]
impl MarketplaceApi for RejectingApi {
    async fn fetch_categories(&self) -> Result<Vec<Category>, ClientError> {
        Ok(Vec::new())
    }

    async fn put_children(&self, _children: &[Child]) -> Result<(), ClientError> {
        Err(rejected(500))
    }

    async fn login(
        &self,
        credentials: &Credentials,
        remember: bool,
    ) -> Result<Session, ClientError> {
        Ok(Session {
            username: credentials.username_or_email.clone(),
            email: None,
            first_name: None,
            last_name: None,
            access_token: "token".into(),
            refresh_token: None,
            remember,
        })
    }

    async fn fetch_profile(&self) -> Result<UserProfile, ClientError> {
        Ok(UserProfile {
            username: "olena".into(),
            children: vec![parse_child("2019-04-01:FEMALE").expect("child")],
            ..UserProfile::default()
        })
    }

    async fn update_profile(&self, _info: &ProfileInfoUpdate) -> Result<UserProfile, ClientError> {
        Err(rejected(400))
    }
}

fn rejecting_cx() -> Cx {
    Cx::start(Arc::new(RejectingApi), Locale::En, Duration::from_secs(5))
}

fn olena() -> LoginArgs {
    LoginArgs {
        username_or_email: "olena".into(),
        password: "secret".into(),
    }
}

#[test]
fn rejected_profile_update_fails_the_command() {
    let mut cx = rejecting_cx();
    let result = run_profile(&mut cx, &olena(), Some("Olha".into()), None, Vec::new());
    assert!(result.is_err());
}

#[test]
fn rejected_unedited_children_list_fails_the_command() {
    let mut cx = rejecting_cx();
    let result = run_children(&mut cx, &olena(), &[], &[]);
    assert!(result.is_err());
}

#[test]
fn child_argument_parses_date_and_sex() {
    let child = parse_child("2019-04-01:FEMALE").expect("valid");
    assert_eq!(child.birth_date.to_string(), "2019-04-01");
    assert_eq!(child.sex, Sex::Female);
}

#[test]
fn child_argument_rejects_bad_input() {
    assert!(parse_child("2019-04-01").is_err());
    assert!(parse_child("2019-13-01:MALE").is_err());
    assert!(parse_child("2019-04-01:OTHER").is_err());
}

#[test]
fn children_command_collects_repeated_flags() {
    let cli = Cli::try_parse_from([
        "marketplace",
        "--locale",
        "en",
        "children",
        "--username-or-email",
        "olena",
        "--password",
        "secret",
        "--child",
        "2019-04-01:FEMALE",
        "--child",
        "2021-09-01:MALE",
        "--remove",
        "0",
    ])
    .expect("parse");

    assert_eq!(cli.locale, Some(Locale::En));
    let Command::Children {
        login,
        children,
        remove,
    } = cli.command
    else {
        panic!("expected children command");
    };
    assert_eq!(login.username_or_email, "olena");
    assert_eq!(children.len(), 2);
    assert_eq!(remove, vec![0]);
}

#[test]
fn config_path_defaults_to_marketplace_toml() {
    let cli = Cli::try_parse_from(["marketplace", "categories"]).expect("parse");
    assert_eq!(cli.config, std::path::PathBuf::from("marketplace.toml"));
    assert!(matches!(
        cli.command,
        Command::Categories {
            category: None,
            subcategory: None
        }
    ));
}
