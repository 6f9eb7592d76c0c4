use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use console::Term;
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};
use office_auth::{
    AuthError, AuthFlow, AuthOutcome, AuthStep, Config, Field, FileStore, FlowOptions,
    KeyValueStore, MobileNumber, SupabaseAdapter, User,
};
use supabase::SupabaseService;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Login,
    Signup,
    Otp,
}

impl From<Mode> for AuthStep {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Login => AuthStep::Login,
            Mode::Signup => AuthStep::Signup,
            Mode::Otp => AuthStep::Otp,
        }
    }
}

/// Log in to the law-office backend from a terminal
#[derive(Debug, Parser)]
#[command(name = "office-login", version)]
struct Args {
    /// Step to start on
    #[arg(long, value_enum, default_value = "login")]
    mode: Mode,

    /// Mobile number of an already known user
    #[arg(long)]
    mobile: Option<String>,

    /// Pretend the network is down (cached login only)
    #[arg(long)]
    offline: bool,

    /// Echo the password while typing it
    #[arg(long)]
    show_password: bool,

    /// Mark this device as logged out and exit
    #[arg(long)]
    logout: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,office_auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let args = Args::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(
        url = %config.supabase_url,
        cache_dir = %config.cache_dir.display(),
        "configuration loaded"
    );

    let store: Arc<dyn KeyValueStore> = Arc::new(
        FileStore::open(&config.cache_dir)
            .with_context(|| format!("Failed to open cache dir {}", config.cache_dir.display()))?,
    );
    let backend = Arc::new(SupabaseAdapter::new(Arc::new(SupabaseService::new(
        config.supabase_options(),
    ))));

    let mut flow = AuthFlow::new(
        backend.clone(),
        store,
        FlowOptions {
            initial_step: args.mode.into(),
            current_mobile: args.mobile,
            email_domain: config.email_domain.clone(),
            online: !args.offline,
            ..FlowOptions::default()
        },
    );
    if args.show_password {
        flow.toggle_password_visibility();
    }

    if args.logout {
        flow.logout().context("Failed to mark device as logged out")?;
        backend.sign_out().await;
        println!("{}", "Logged out.".bright_blue());
        return Ok(());
    }

    let term = Term::stdout();
    let theme = ColorfulTheme::default();
    print_banner(&term)?;

    loop {
        print_notices(&flow);

        let result = match flow.state().step {
            AuthStep::Login | AuthStep::Signup => match form_screen(&mut flow, &theme)? {
                Action::Submit => flow.submit().await,
                Action::Toggle => {
                    flow.toggle_mode();
                    continue;
                }
                Action::Retry | Action::Back => continue,
                Action::Quit => break,
            },
            AuthStep::Otp => match otp_screen(&mut flow, &theme)? {
                Action::Submit => flow.submit_otp().await,
                Action::Back => flow.leave_otp().await,
                Action::Toggle | Action::Retry => continue,
                Action::Quit => break,
            },
        };

        match result {
            Ok(AuthOutcome::LoggedIn { user, offline }) => {
                let how = if offline { " (offline)" } else { "" };
                println!(
                    "{} {}{}",
                    "✅ Logged in as".bright_green().bold(),
                    display_name(&user, &config.email_domain),
                    how
                );
                break;
            }
            Ok(AuthOutcome::Verified) | Ok(AuthOutcome::LoggedOut) => break,
            Ok(_) => {}
            Err(e) => print_error(&e),
        }
    }

    Ok(())
}

enum Action {
    Submit,
    Toggle,
    Retry,
    Back,
    Quit,
}

fn print_banner(term: &Term) -> Result<()> {
    term.clear_screen()?;
    println!("{}", "╔════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║          Law Office Login              ║".bright_cyan());
    println!("{}", "╚════════════════════════════════════════╝".bright_cyan());
    println!();
    Ok(())
}

/// The user's mobile when their auth email is one we derived from it.
fn display_name(user: &User, email_domain: &str) -> String {
    user.email
        .as_deref()
        .and_then(|email| MobileNumber::from_synthetic_email(email, email_domain))
        .map(|mobile| mobile.e164())
        .unwrap_or_else(|| user.id.to_string())
}

fn print_notices(flow: &AuthFlow) {
    let state = flow.state();
    println!();
    println!("{}", state.step.title().bold());
    if let Some(info) = &state.info {
        println!("{}", info.bright_yellow());
    }
    if let Some(message) = &state.message {
        println!("{}", message.bright_green());
    }
}

fn print_error(error: &AuthError) {
    println!("{}", error.user_message().bright_red());
    if let Some(action) = error.recovery() {
        println!("{} {}", "→".bright_red(), action.label());
    }
}

fn form_screen(flow: &mut AuthFlow, theme: &ColorfulTheme) -> Result<Action> {
    let signup = flow.state().step == AuthStep::Signup;

    if signup {
        let full_name: String = Input::with_theme(theme)
            .with_prompt("الاسم الكامل")
            .with_initial_text(flow.state().form.full_name.clone())
            .allow_empty(true)
            .interact_text()?;
        flow.set_field(Field::FullName, full_name);
    }

    let mobile: String = Input::with_theme(theme)
        .with_prompt("رقم الجوال")
        .with_initial_text(flow.state().form.mobile.clone())
        .allow_empty(true)
        .interact_text()?;
    flow.set_field(Field::Mobile, mobile);

    let keep_cached = !flow.state().form.password.is_empty();
    let prompt = if keep_cached {
        "كلمة المرور (اتركها فارغة لاستخدام المحفوظة)"
    } else {
        "كلمة المرور"
    };
    let password = if flow.state().show_password {
        Input::<String>::with_theme(theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?
    } else {
        Password::with_theme(theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?
    };
    if !password.is_empty() || !keep_cached {
        flow.set_field(Field::Password, password);
    }

    let (submit, toggle) = if signup {
        ("إنشاء الحساب", "لديك حساب؟ تسجيل الدخول")
    } else {
        ("تسجيل الدخول", "ليس لديك حساب؟ إنشاء حساب جديد")
    };
    let mut items = vec![submit, toggle, "خروج"];
    if signup && !flow.state().online {
        items.remove(0);
    }

    let selection = Select::with_theme(theme)
        .items(&items)
        .default(0)
        .interact()?;

    Ok(match items[selection] {
        s if s == submit => Action::Submit,
        t if t == toggle => Action::Toggle,
        _ => Action::Quit,
    })
}

fn otp_screen(flow: &mut AuthFlow, theme: &ColorfulTheme) -> Result<Action> {
    if flow.state().form.mobile.is_empty() {
        let mobile: String = Input::with_theme(theme)
            .with_prompt("رقم الجوال")
            .interact_text()?;
        flow.set_field(Field::Mobile, mobile);
    }

    let code: String = Input::with_theme(theme)
        .with_prompt("كود التفعيل (6 أرقام)")
        .allow_empty(true)
        .interact_text()?;
    flow.set_otp_code(&code);

    // Submit stays unavailable until six digits are entered.
    let complete = flow.state().can_submit();
    if !complete {
        println!("{}", office_auth::messages::INVALID_OTP_CODE.bright_red());
    }
    let items: &[&str] = if complete {
        &["تحقق", "رجوع", "خروج"]
    } else {
        &["إعادة الإدخال", "رجوع", "خروج"]
    };

    let selection = Select::with_theme(theme)
        .items(items)
        .default(0)
        .interact()?;

    Ok(match selection {
        0 if complete => Action::Submit,
        0 => Action::Retry,
        1 => Action::Back,
        _ => Action::Quit,
    })
}
