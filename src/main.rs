use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use timeclock::config::{
    ClockArgs, CompanyArgs, CompanyCommand, Command, FilterArgs, InvitationCommand, UserCommand,
};
use timeclock::core::summary::{daily_totals, total_hours};
use timeclock::domain::model::TimeLogStatus;
use timeclock::domain::photo::PhotoEvidence;
use timeclock::domain::requests::{
    ApprovalDecision, ClockEvent, CompanyProfile, GeoPoint, LoginRequest, ManualTimeLogRequest,
    NewInvitation, NewUser, ProfileUpdate, RegisterRequest, TimeLogQuery, UserUpdate,
};
use timeclock::utils::error::{ClientError, ErrorSeverity, Result};
use timeclock::utils::logger;
use timeclock::{ApiClient, ClientSettings, CliConfig, ClockSession, FileTokenStore};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let settings = match ClientSettings::resolve(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    logger::init_cli_logger(cli.verbose, settings.json_logs, settings.log_level.as_deref());
    tracing::debug!("Resolved settings: {:?}", settings);

    if let Err(e) = run(cli.command, &settings).await {
        tracing::error!(
            "Command failed: {} (Category: {:?}, Severity: {:?}, Status: {:?})",
            e,
            e.category(),
            e.severity(),
            e.status()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(error: &ClientError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 3,
        ErrorSeverity::Critical => 4,
    }
}

async fn run(command: Command, settings: &ClientSettings) -> Result<()> {
    let store = Arc::new(FileTokenStore::new(settings.token_file.clone()));
    let client = Arc::new(ApiClient::new(settings, store)?);

    match command {
        Command::Login { email, password } => {
            let auth = client.login(&LoginRequest { email, password }).await?;
            match auth.user {
                Some(user) => println!("✅ Logged in as {} ({})", user.name, user.role),
                None => println!("✅ Logged in"),
            }
        }
        Command::Register {
            name,
            email,
            password,
            confirm_password,
            invitation_code,
        } => {
            let request = RegisterRequest {
                name,
                email,
                password,
                confirm_password,
                invitation_code,
            };
            client.register(&request).await?;
            println!("✅ Account created for {}", request.email);
        }
        Command::Logout => {
            client.logout().await?;
            println!("👋 Logged out");
        }
        Command::Whoami => print_json(&require_login(&client).await?.profile().await?)?,
        Command::Profile(args) => {
            let update = ProfileUpdate {
                name: args.name,
                email: args.email,
                password: args.password,
                confirm_password: args.confirm_password,
            };
            print_json(&require_login(&client).await?.update_profile(&update).await?)?;
        }
        Command::UploadPhoto { path } => {
            let photo = PhotoEvidence::from_file(&path).await?;
            let user = require_login(&client).await?.upload_profile_photo(photo).await?;
            println!(
                "✅ Profile photo updated{}",
                user.photo_url
                    .map(|url| format!(": {}", url))
                    .unwrap_or_default()
            );
        }
        Command::CheckIn(args) => {
            require_login(&client).await?;
            let mut session = ClockSession::new(client.clone());
            let log = session.check_in(clock_event(args).await?).await?;
            println!(
                "✅ Checked in at {}",
                log.check_in.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        Command::CheckOut(args) => {
            require_login(&client).await?;
            let mut session = ClockSession::new(client.clone());
            let log = session.check_out(clock_event(args).await?).await?;
            println!(
                "✅ Checked out. Worked {:.2} hours",
                log.hours().unwrap_or_default()
            );
        }
        Command::Status => {
            require_login(&client).await?;
            let mut session = ClockSession::new(client.clone());
            session.sync().await?;
            match session.active() {
                Some(log) => {
                    let elapsed = session
                        .elapsed(chrono::Utc::now())
                        .unwrap_or_else(chrono::Duration::zero);
                    println!(
                        "🟢 Checked in since {} ({}h {:02}m)",
                        log.check_in.format("%Y-%m-%d %H:%M UTC"),
                        elapsed.num_hours(),
                        elapsed.num_minutes() % 60
                    );
                }
                None => println!("⚪ Not checked in"),
            }
        }
        Command::Logs {
            filter,
            status,
            summary,
        } => {
            let logs = require_login(&client)
                .await?
                .time_logs(&query(filter, status))
                .await?;
            if summary {
                let totals = daily_totals(&logs);
                for day in &totals {
                    println!("{}  {:>6.2}h  ({} sessions)", day.date, day.hours(), day.sessions);
                }
                println!("Total: {:.2}h", total_hours(&totals));
            } else {
                print_json(&logs)?;
            }
        }
        Command::Report { filter } => {
            let report = require_login(&client)
                .await?
                .time_report(&query(filter, None))
                .await?;
            print_json(&report)?;
        }
        Command::Manual {
            user_id,
            check_in,
            check_out,
            notes,
        } => {
            let request = ManualTimeLogRequest {
                user_id,
                check_in,
                check_out,
                notes,
            };
            let log = require_login(&client)
                .await?
                .create_manual_time_log(&request)
                .await?;
            println!("✅ Manual time log {} created ({})", log.id, log.status);
        }
        Command::Pending => print_json(&require_login(&client).await?.pending_time_logs().await?)?,
        Command::Approve { id } => {
            let log = require_login(&client)
                .await?
                .decide_time_log(id, &ApprovalDecision::approve())
                .await?;
            println!("✅ Time log {} {}", log.id, log.status);
        }
        Command::Reject { id, reason } => {
            let log = require_login(&client)
                .await?
                .decide_time_log(id, &ApprovalDecision::reject(reason))
                .await?;
            println!("✅ Time log {} {}", log.id, log.status);
        }
        Command::Users(command) => run_users(&*require_login(&client).await?, command).await?,
        Command::Invitations(command) => run_invitations(&client, command).await?,
        Command::Company(command) => {
            run_company(&*require_login(&client).await?, command).await?
        }
    }

    Ok(())
}

async fn run_users(client: &ApiClient, command: UserCommand) -> Result<()> {
    match command {
        UserCommand::List => print_json(&client.users().await?),
        UserCommand::Show { id } => print_json(&client.user(id).await?),
        UserCommand::Create {
            name,
            email,
            password,
            role,
        } => print_json(
            &client
                .create_user(&NewUser {
                    name,
                    email,
                    password,
                    role,
                })
                .await?,
        ),
        UserCommand::Update {
            id,
            name,
            email,
            role,
            active,
        } => print_json(
            &client
                .update_user(
                    id,
                    &UserUpdate {
                        name,
                        email,
                        role,
                        is_active: active,
                    },
                )
                .await?,
        ),
        UserCommand::Delete { id } => {
            client.delete_user(id).await?;
            println!("🗑️  User {} deleted", id);
            Ok(())
        }
    }
}

async fn run_invitations(client: &Arc<ApiClient>, command: InvitationCommand) -> Result<()> {
    match command {
        InvitationCommand::Validate { code } => {
            let check = client.validate_invitation(&code).await?;
            if check.valid {
                println!(
                    "✅ Invitation valid{}",
                    check
                        .company_name
                        .map(|name| format!(" for {}", name))
                        .unwrap_or_default()
                );
            } else {
                println!("❌ Invitation is not valid");
            }
            Ok(())
        }
        InvitationCommand::List => print_json(&require_login(client).await?.invitations().await?),
        InvitationCommand::Create { email, role } => {
            let invitation = require_login(client)
                .await?
                .create_invitation(&NewInvitation { email, role })
                .await?;
            println!("✅ Invitation code for {}: {}", invitation.email, invitation.code);
            Ok(())
        }
        InvitationCommand::Delete { id } => {
            require_login(client).await?.delete_invitation(id).await?;
            println!("🗑️  Invitation {} deleted", id);
            Ok(())
        }
    }
}

async fn run_company(client: &ApiClient, command: CompanyCommand) -> Result<()> {
    match command {
        CompanyCommand::Show => print_json(&client.company().await?),
        CompanyCommand::Create(args) => print_json(&client.create_company(&company(args)).await?),
        CompanyCommand::Update(args) => print_json(&client.update_company(&company(args)).await?),
        CompanyCommand::Delete => {
            client.delete_company().await?;
            println!("🗑️  Company deleted");
            Ok(())
        }
    }
}

async fn require_login(client: &Arc<ApiClient>) -> Result<&Arc<ApiClient>> {
    if client.is_authenticated().await? {
        Ok(client)
    } else {
        Err(ClientError::NotAuthenticated)
    }
}

async fn clock_event(args: ClockArgs) -> Result<ClockEvent> {
    let photo = match args.photo {
        Some(path) => Some(PhotoEvidence::from_file(path).await?),
        None => None,
    };
    let location = match (args.latitude, args.longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    };
    Ok(ClockEvent {
        photo,
        location,
        notes: args.notes,
    })
}

fn query(filter: FilterArgs, status: Option<TimeLogStatus>) -> TimeLogQuery {
    TimeLogQuery {
        start_date: filter.from,
        end_date: filter.to,
        user_id: filter.user_id,
        status,
    }
}

fn company(args: CompanyArgs) -> CompanyProfile {
    CompanyProfile {
        name: args.name,
        address: args.address,
        phone: args.phone,
        email: args.email,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
