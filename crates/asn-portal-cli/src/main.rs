use anyhow::Result;
use asn_portal_core::services::auth::SignUpRequest;
use asn_portal_core::services::onboarding::DeploymentType;
use asn_portal_core::services::settings::GstinRequest;
use asn_portal_core::{ConfigLoader, GuardOutcome, Portal, StepTracker};
use clap::{Parser, Subcommand};
use log::LevelFilter;

const DEFAULT_SESSION_FILE: &str = ".asn-session.json";

#[derive(Parser, Debug)]
#[clap(
    name = "asn-portal",
    author,
    version = "0.1.0",
    about = "ASN vendor onboarding portal client"
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(
        long,
        short,
        default_value = "asn-portal.yaml",
        help = "Path to the portal configuration file"
    )]
    config: String,

    #[clap(long, short, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in with portal credentials; an OTP is mailed on success
    SignIn {
        username: String,
        password: String,
    },
    /// Verify the mailed OTP and complete authentication
    VerifyOtp { otp: String },
    /// Request a fresh OTP for the pending sign-in
    ResendOtp,
    /// Register a new vendor account
    SignUp {
        #[clap(long)]
        company_name: String,
        #[clap(long)]
        pan: String,
        #[clap(long)]
        contact_person: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        mobile: String,
        #[clap(long)]
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// OEM portal listing and selection
    Oems {
        #[clap(subcommand)]
        action: OemCommands,
    },
    /// Onboarding progression for the selected OEM
    Onboarding {
        #[clap(subcommand)]
        action: OnboardingCommands,
    },
    /// GSTIN registrations under settings
    Gstin {
        #[clap(subcommand)]
        action: GstinCommands,
    },
    /// List the subscription plan catalog
    Plans,
    /// Dashboard summary for the selected OEM
    Dashboard,
    /// Send a one-shot message to the AI assistant
    Chat { message: String },
}

#[derive(Subcommand, Debug)]
enum OemCommands {
    /// List OEM portals available to this vendor
    List,
    /// Select the OEM to onboard into
    Select { oem_id: String },
    /// Request access to a locked OEM portal
    RequestAccess { oem_id: String },
}

#[derive(Subcommand, Debug)]
enum OnboardingCommands {
    /// Show server-tracked progress and the current local step
    Status,
    /// Confirm ASN 2.1 activation and advance to payment
    Confirm,
    /// Choose the deployment path after payment
    SelectDeployment {
        #[clap(value_parser = parse_deployment, help = "'self' or 'assisted'")]
        deployment_type: DeploymentType,
    },
    /// Issue API credentials for self-deployment
    CreateCredentials {
        #[clap(long, default_value = "sandbox")]
        environment: String,
        #[clap(long)]
        esakha_user: String,
        #[clap(long)]
        esakha_password: String,
        #[clap(long)]
        webhook_url: Option<String>,
        #[clap(long, help = "Directory to export the credentials JSON into")]
        export: Option<std::path::PathBuf>,
    },
    /// Mark onboarding complete
    Complete,
}

#[derive(Subcommand, Debug)]
enum GstinCommands {
    /// List GSTIN registrations, primary first
    List,
    /// Add a GSTIN registration
    Add {
        gstin: String,
        #[clap(long)]
        vendor_code: String,
        #[clap(long)]
        state_code: String,
        #[clap(long)]
        primary: bool,
    },
}

fn parse_deployment(value: &str) -> Result<DeploymentType, String> {
    match value {
        "self" => Ok(DeploymentType::SelfDeployment),
        "assisted" => Ok(DeploymentType::Assisted),
        other => Err(format!("'{}' is not a deployment type (self|assisted)", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Warn);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    let mut config = ConfigLoader::from_file(&cli.config).await?;
    // CLI invocations are separate processes, so the session always lives in
    // a snapshot file.
    if config.session.snapshot_path.is_none() {
        config.session.snapshot_path = Some(DEFAULT_SESSION_FILE.into());
    }
    let portal = Portal::new(config)?;

    match cli.command {
        Commands::SignIn { username, password } => {
            portal.auth().sign_in(&username, &password).await?;
            println!("OTP sent to {}. Run `asn-portal verify-otp <OTP>` to finish.", username);
        }
        Commands::VerifyOtp { otp } => {
            let claims = portal.auth().verify_otp(&otp).await?;
            println!(
                "Signed in as {}.",
                claims.sub.as_deref().unwrap_or("unknown account")
            );
        }
        Commands::ResendOtp => {
            portal.auth().resend_otp().await?;
            println!("A fresh OTP is on its way.");
        }
        Commands::SignUp {
            company_name,
            pan,
            contact_person,
            email,
            mobile,
            password,
        } => {
            let request = SignUpRequest {
                company_name,
                pan_number: pan,
                contact_person,
                email,
                mobile,
                password,
            };
            let ack = portal.auth().sign_up(&request).await?;
            println!("{}", ack.message);
        }
        Commands::Logout => {
            portal.auth().logout();
            println!("Session cleared.");
        }
        Commands::Oems { action } => handle_oems(&portal, action).await?,
        Commands::Onboarding { action } => handle_onboarding(&portal, action).await?,
        Commands::Gstin { action } => handle_gstin(&portal, action).await?,
        Commands::Plans => {
            let catalog = portal.plans().plans().await?;
            for plan in &catalog.plans {
                let marker = if plan.featured { " (featured)" } else { "" };
                println!(
                    "{:<12} {:<24} {} {}/yr{}",
                    plan.plan_code,
                    plan.plan_name,
                    plan.pricing.currency,
                    plan.pricing.yearly,
                    marker
                );
            }
        }
        Commands::Dashboard => {
            require_oem_selected(&portal)?;
            let stats = portal.dashboard().stats().await?;
            println!("Progress:      {:.0}%", stats.progress);
            println!("Steps:         {}", stats.completed_steps);
            println!("Plan:          {}", stats.current_plan);
            println!("Status:        {}", stats.status);
            if !stats.next_action.is_empty() {
                println!("Next action:   {}", stats.next_action);
            }
            if let Some(alert) = &stats.critical_alert {
                println!("ALERT [{}]: {} - {}", alert.severity, alert.title, alert.message);
            }
        }
        Commands::Chat { message } => {
            let mut chat = portal.chat();
            let reply = chat.send_message(&message).await?;
            println!("{}", reply.content);
        }
    }

    Ok(())
}

fn require_oem_selected(portal: &Portal) -> Result<()> {
    if let GuardOutcome::Redirect(route) = asn_portal_core::guards::require_oem(portal.session()) {
        anyhow::bail!(
            "this command needs an authenticated session with a selected OEM (blocked at {:?})",
            route
        );
    }
    Ok(())
}

async fn handle_oems(portal: &Portal, action: OemCommands) -> Result<()> {
    let oems = portal.oems();
    match action {
        OemCommands::List => {
            let available = oems.available_oems().await?;
            for oem in &available.oems {
                let state = if oem.is_coming_soon {
                    "coming soon"
                } else if oem.no_access {
                    "locked"
                } else {
                    "open"
                };
                println!("{:<12} {:<30} [{}] {}", oem.oem_code, oem.full_name, state, oem.id);
            }
        }
        OemCommands::Select { oem_id } => {
            let available = oems.available_oems().await?;
            let oem = available
                .oems
                .iter()
                .find(|o| o.id == oem_id || o.oem_code == oem_id)
                .ok_or_else(|| anyhow::anyhow!("no OEM matches '{}'", oem_id))?;
            oems.select_oem(oem)?;
            println!("Selected {} ({}).", oem.full_name, oem.oem_code);
        }
        OemCommands::RequestAccess { oem_id } => {
            let ack = oems.request_access(&oem_id).await?;
            println!("Access request recorded: {}", ack.status);
        }
    }
    Ok(())
}

async fn handle_onboarding(portal: &Portal, action: OnboardingCommands) -> Result<()> {
    require_oem_selected(portal)?;
    let onboarding = portal.onboarding();

    match action {
        OnboardingCommands::Status => {
            // Server progress wins over the local pointer when reachable.
            let progress = match onboarding.progress().await {
                Ok(progress) => Some(progress),
                Err(e) => {
                    log::warn!("Progress fetch failed, resuming from local state: {}", e);
                    None
                }
            };
            let tracker = StepTracker::resume(portal.session().clone(), progress.as_ref());
            if let Some(progress) = &progress {
                println!(
                    "Server: {}/{} steps complete ({:.0}%)",
                    progress.completed_steps, progress.total_steps, progress.percentage
                );
                for step in &progress.steps {
                    println!("  [{:?}] {}", step.status, step.title);
                }
            }
            println!("Current step: {}", tracker.current().as_str());
        }
        OnboardingCommands::Confirm => {
            let ack = onboarding.confirm_asn().await?;
            let mut tracker = StepTracker::resume(portal.session().clone(), None);
            tracker.confirmation_acknowledged(true)?;
            println!("ASN activation confirmed ({}). Now at the payment step.", ack.status);
        }
        OnboardingCommands::SelectDeployment { deployment_type } => {
            let ack = onboarding.select_deployment(deployment_type).await?;
            let mut tracker = StepTracker::resume(portal.session().clone(), None);
            let route = tracker.deployment_selected(deployment_type)?;
            println!("Deployment recorded ({}). Continue at {:?}.", ack.status, route);
        }
        OnboardingCommands::CreateCredentials {
            environment,
            esakha_user,
            esakha_password,
            webhook_url,
            export,
        } => {
            let credentials = onboarding
                .create_credentials(&environment, &esakha_user, &esakha_password, webhook_url)
                .await?;
            println!("Developer ID:  {}", credentials.developer_id);
            println!("API key:       {}", credentials.api_key);
            println!("Client secret: {}", credentials.client_secret);
            println!("Endpoint:      {}", credentials.endpoint_url);
            if let Some(dir) = export {
                let path = asn_portal_core::export::export_to_dir(&credentials, &dir).await?;
                println!("Credentials written to {}", path.display());
            }
        }
        OnboardingCommands::Complete => {
            let ack = onboarding.complete().await?;
            println!("Onboarding complete: {}", ack.status);
        }
    }
    Ok(())
}

async fn handle_gstin(portal: &Portal, action: GstinCommands) -> Result<()> {
    require_oem_selected(portal)?;
    let settings = portal.settings();

    match action {
        GstinCommands::List => {
            for detail in settings.gstin_management().await? {
                let marker = if detail.primary { " (primary)" } else { "" };
                println!(
                    "{:<16} state {:<3} vendor {:<10} {}{}",
                    detail.gstin, detail.state_code, detail.vendor_code, detail.status, marker
                );
            }
        }
        GstinCommands::Add {
            gstin,
            vendor_code,
            state_code,
            primary,
        } => {
            let request = GstinRequest {
                gstin,
                vendor_code,
                state_code,
                primary,
            };
            let created = settings.create_gstin(&request).await?;
            println!("Added GSTIN {} ({}).", created.gstin, created.gstin_id);
        }
    }
    Ok(())
}
