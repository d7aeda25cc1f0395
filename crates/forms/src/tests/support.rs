use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use client_core::{ClientError, MarketplaceApi};
use shared::{
    domain::{Category, CategoryId, Child, Sex, Subcategory, SubcategoryId, UserProfile},
    protocol::{Credentials, ProfileInfoUpdate, Session},
};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn today() -> NaiveDate {
    date(2024, 6, 1)
}

pub fn child(year: i32, sex: Sex) -> Child {
    Child {
        birth_date: date(year, 4, 1),
        sex,
    }
}

pub fn sample_categories() -> Vec<Category> {
    vec![
        Category {
            id: CategoryId(1),
            name: "Clothes".into(),
            subcategories: vec![
                Subcategory {
                    id: SubcategoryId(11),
                    name: "Shoes".into(),
                },
                Subcategory {
                    id: SubcategoryId(12),
                    name: "Jackets".into(),
                },
            ],
        },
        Category {
            id: CategoryId(2),
            name: "Toys".into(),
            subcategories: vec![Subcategory {
                id: SubcategoryId(21),
                name: "Puzzles".into(),
            }],
        },
    ]
}

pub fn bad_request(message: &str) -> ClientError {
    ClientError::Status {
        status: 400,
        message: message.into(),
    }
}

pub struct FakeApi {
    categories: Result<Vec<Category>, ClientError>,
    children_error: Option<ClientError>,
    login_error: Option<ClientError>,
    profile_error: Option<ClientError>,
    profile: Mutex<UserProfile>,
    delay: Option<Duration>,
    pub category_calls: AtomicUsize,
    pub saved_children: Mutex<Vec<Vec<Child>>>,
    pub logins: Mutex<Vec<(Credentials, bool)>>,
    pub profile_updates: Mutex<Vec<ProfileInfoUpdate>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            categories: Ok(sample_categories()),
            children_error: None,
            login_error: None,
            profile_error: None,
            profile: Mutex::new(UserProfile {
                username: "olena".into(),
                ..UserProfile::default()
            }),
            delay: None,
            category_calls: AtomicUsize::new(0),
            saved_children: Mutex::new(Vec::new()),
            logins: Mutex::new(Vec::new()),
            profile_updates: Mutex::new(Vec::new()),
        }
    }
}

impl FakeApi {
    pub fn failing_categories(mut self, err: ClientError) -> Self {
        self.categories = Err(err);
        self
    }

    pub fn failing_children(mut self, err: ClientError) -> Self {
        self.children_error = Some(err);
        self
    }

    pub fn failing_login(mut self, err: ClientError) -> Self {
        self.login_error = Some(err);
        self
    }

    pub fn failing_profile(mut self, err: ClientError) -> Self {
        self.profile_error = Some(err);
        self
    }

    pub fn with_profile(self, profile: UserProfile) -> Self {
        *self.profile.lock().expect("lock") = profile;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn category_calls(&self) -> usize {
        self.category_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl MarketplaceApi for FakeApi {
    async fn fetch_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.category_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.categories.clone()
    }

    async fn put_children(&self, children: &[Child]) -> Result<(), ClientError> {
        self.pause().await;
        if let Some(err) = &self.children_error {
            return Err(err.clone());
        }
        self.saved_children
            .lock()
            .expect("lock")
            .push(children.to_vec());
        self.profile.lock().expect("lock").children = children.to_vec();
        Ok(())
    }

    async fn login(
        &self,
        credentials: &Credentials,
        remember: bool,
    ) -> Result<Session, ClientError> {
        self.pause().await;
        self.logins
            .lock()
            .expect("lock")
            .push((credentials.clone(), remember));
        if let Some(err) = &self.login_error {
            return Err(err.clone());
        }
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
        Ok(self.profile.lock().expect("lock").clone())
    }

    async fn update_profile(&self, info: &ProfileInfoUpdate) -> Result<UserProfile, ClientError> {
        self.pause().await;
        self.profile_updates
            .lock()
            .expect("lock")
            .push(info.clone());
        if let Some(err) = &self.profile_error {
            return Err(err.clone());
        }
        let mut profile = self.profile.lock().expect("lock");
        profile.first_name = info.first_name.clone();
        profile.last_name = info.last_name.clone();
        profile.phones = info.phones.clone();
        Ok(profile.clone())
    }
}
