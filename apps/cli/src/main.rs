mod config;

use std::{collections::BTreeSet, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use client_core::{HttpMarketplaceClient, MarketplaceApi};
use crossbeam_channel::Receiver;
use forms::{
    backend_bridge::{self, BackendEvent, FormSession},
    BuiltinCatalog, FieldErrors, NoticeLevel, NoticeLog, NoticeSink, Translator,
};
use shared::domain::{CategoryId, Child, Locale, Sex, SubcategoryId};
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, Settings, DEFAULT_CONFIG_PATH};

const QUEUE_DEPTH: usize = 32;

#[derive(Parser, Debug)]
#[command(name = "marketplace", about = "Marketplace account and listing forms")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Overrides the configured UI language (uk, en, ru).
    #[arg(long)]
    locale: Option<Locale>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    username_or_email: String,
    #[arg(long)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[command(flatten)]
        login: LoginArgs,
        #[arg(long)]
        remember: bool,
    },
    Categories {
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        subcategory: Option<i64>,
    },
    Children {
        #[command(flatten)]
        login: LoginArgs,
        /// A child as `YYYY-MM-DD:SEX`, e.g. `2019-04-01:FEMALE`.
        #[arg(long = "child", value_parser = parse_child)]
        children: Vec<Child>,
        /// Zero-based row to drop before new children are added.
        #[arg(long = "remove")]
        remove: Vec<usize>,
    },
    Profile {
        #[command(flatten)]
        login: LoginArgs,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long = "phone")]
        phones: Vec<String>,
    },
}

fn parse_child(raw: &str) -> Result<Child, String> {
    let (date, sex) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected YYYY-MM-DD:SEX, got '{raw}'"))?;
    let birth_date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|err| format!("invalid birth date '{date}': {err}"))?;
    let sex = sex.trim().parse::<Sex>().map_err(|err| err.to_string())?;
    Ok(Child { birth_date, sex })
}

struct Cx {
    session: FormSession,
    events: Receiver<BackendEvent>,
    notices: Arc<NoticeLog>,
    catalog: BuiltinCatalog,
    wait: Duration,
}

impl Cx {
    fn locale(&self) -> Locale {
        self.session.store().snapshot().locale
    }

    /// Blocks for the next backend result and applies it to the forms. An
    /// error notice raised by the result fails the step.
    fn pump(&mut self) -> Result<()> {
        let event = self
            .events
            .recv_timeout(self.wait)
            .context("backend worker did not answer in time")?;
        let handled = self.session.handle_event(event);
        let failed = self.flush_notices();
        handled.context("request failed")?;
        if failed {
            bail!("request was not accepted");
        }
        Ok(())
    }

    /// Prints pending notices; returns whether any of them was an error.
    fn flush_notices(&self) -> bool {
        let locale = self.locale();
        let mut failed = false;
        for notice in self.notices.drain() {
            let text = self.catalog.render(locale, &notice.message);
            match notice.level {
                NoticeLevel::Success => println!("ok: {text}"),
                NoticeLevel::Error => {
                    failed = true;
                    eprintln!("error: {text}");
                }
            }
        }
        failed
    }

    fn print_field_errors(&self, errors: &FieldErrors) {
        let locale = self.locale();
        for (field, message) in errors.iter() {
            eprintln!("{field}: {}", self.catalog.render(locale, message));
        }
    }

    fn sign_in(&mut self, args: &LoginArgs, remember: bool) -> Result<()> {
        self.session.login.set_username_or_email(&args.username_or_email);
        self.session.login.set_password(&args.password);
        if self.session.login.remember() != remember {
            self.session.login.toggle_remember();
        }

        if !self.session.request_login() {
            self.print_field_errors(self.session.login.errors());
            if !self.session.status().is_empty() {
                bail!("{}", self.session.status());
            }
            bail!("login form is invalid");
        }
        self.pump()?;

        if self.session.store().snapshot().session.is_none() {
            self.print_field_errors(self.session.login.errors());
            bail!("login rejected");
        }
        // a successful login queues the profile fetch
        self.pump()?;
        if self.session.store().snapshot().profile.is_none() {
            bail!("profile could not be loaded");
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config);
    if let Some(locale) = cli.locale {
        settings.locale = locale;
    }

    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut cx = connect(&settings)?;
    match cli.command {
        Command::Login { login, remember } => run_login(&mut cx, &login, remember),
        Command::Categories {
            category,
            subcategory,
        } => run_categories(&mut cx, category, subcategory),
        Command::Children {
            login,
            children,
            remove,
        } => run_children(&mut cx, &login, &children, &remove),
        Command::Profile {
            login,
            first_name,
            last_name,
            phones,
        } => run_profile(&mut cx, &login, first_name, last_name, phones),
    }
}

fn connect(settings: &Settings) -> Result<Cx> {
    let client =
        HttpMarketplaceClient::with_timeout(&settings.api_base_url, settings.request_timeout())
            .with_context(|| format!("invalid api base url '{}'", settings.api_base_url))?;
    tracing::info!(base_url = %client.base_url(), locale = %settings.locale, "starting marketplace client");
    Ok(Cx::start(
        Arc::new(client),
        settings.locale,
        settings.request_timeout() + Duration::from_secs(5),
    ))
}

impl Cx {
    fn start(api: Arc<dyn MarketplaceApi>, locale: Locale, wait: Duration) -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(QUEUE_DEPTH);
        let (event_tx, event_rx) = crossbeam_channel::bounded(QUEUE_DEPTH);
        backend_bridge::launch(api, cmd_rx, event_tx);

        let store = Arc::new(forms::AppStore::new(locale));
        let notices = Arc::new(NoticeLog::new());
        let sink: Arc<dyn NoticeSink> = notices.clone();

        Self {
            session: FormSession::new(store, sink, cmd_tx),
            events: event_rx,
            notices,
            catalog: BuiltinCatalog,
            wait,
        }
    }
}

fn run_login(cx: &mut Cx, login: &LoginArgs, remember: bool) -> Result<()> {
    cx.sign_in(login, remember)?;
    let snapshot = cx.session.store().snapshot();
    if let (Some(session), Some(profile)) = (&snapshot.session, &snapshot.profile) {
        println!(
            "logged in as {} (remember: {})",
            session.username, session.remember
        );
        println!("name: {} {}", profile.first_name, profile.last_name);
        println!("children: {}", profile.children.len());
    }
    Ok(())
}

fn run_categories(cx: &mut Cx, category: Option<i64>, subcategory: Option<i64>) -> Result<()> {
    if cx.session.request_categories() {
        cx.pump().context("category list unavailable")?;
    }
    if cx.flush_notices() {
        bail!("category list unavailable");
    }
    for option in cx.session.categories.category_options() {
        println!("{}\t{}", option.id, option.name);
    }

    let Some(category) = category else {
        return Ok(());
    };
    cx.session
        .categories
        .select_category(CategoryId(category))
        .context("cannot select category")?;
    for option in cx.session.categories.subcategory_options() {
        println!("  {}\t{}", option.id, option.name);
    }

    if let Some(subcategory) = subcategory {
        cx.session
            .categories
            .select_subcategory(SubcategoryId(subcategory))
            .context("cannot select subcategory")?;
        let selection = cx.session.categories.selection();
        println!(
            "selected category={} subcategory={}",
            category,
            selection.subcategory.map(|id| id.0).unwrap_or_default()
        );
    }
    Ok(())
}

fn run_children(
    cx: &mut Cx,
    login: &LoginArgs,
    children: &[Child],
    remove: &[usize],
) -> Result<()> {
    cx.sign_in(login, false)?;

    let removals: BTreeSet<usize> = remove.iter().copied().collect();
    for index in removals.into_iter().rev() {
        cx.session
            .children
            .remove_record(index)
            .with_context(|| format!("cannot remove child row {index}"))?;
    }

    for child in children {
        let last = cx.session.children.state().len() - 1;
        let blank = cx.session.children.state().records()[last]
            .birth_date
            .is_none();
        let row = if blank {
            last
        } else {
            if !cx.session.children.append_record(cx.notices.as_ref()) {
                cx.flush_notices();
                bail!("cannot add more children");
            }
            last + 1
        };
        cx.session
            .children
            .set_birth_date(row, Some(child.birth_date))
            .context("cannot set birth date")?;
        cx.session
            .children
            .set_sex(row, child.sex)
            .context("cannot set sex")?;
    }

    let today = chrono::Local::now().date_naive();
    if !cx.session.request_children_submit(today) {
        cx.print_field_errors(cx.session.children.errors());
        cx.flush_notices();
        bail!("children form was not submitted");
    }
    cx.pump().context("children were not saved")?;

    for (idx, record) in cx.session.children.state().records().iter().enumerate() {
        let date = record
            .birth_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into());
        println!("{idx}\t{date}\t{}", record.sex);
    }
    Ok(())
}

fn run_profile(
    cx: &mut Cx,
    login: &LoginArgs,
    first_name: Option<String>,
    last_name: Option<String>,
    phones: Vec<String>,
) -> Result<()> {
    cx.sign_in(login, false)?;

    if let Some(first_name) = first_name {
        cx.session.profile.set_first_name(first_name);
    }
    if let Some(last_name) = last_name {
        cx.session.profile.set_last_name(last_name);
    }
    if !phones.is_empty() {
        cx.session.profile.set_phones(phones);
    }

    if !cx.session.request_profile_submit() {
        cx.print_field_errors(cx.session.profile.errors());
        cx.flush_notices();
        bail!("profile form was not submitted");
    }
    cx.pump().context("profile was not saved")?;

    let values = cx.session.profile.values();
    println!("name: {} {}", values.first_name, values.last_name);
    println!("phones: {}", values.phones.join(", "));
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
